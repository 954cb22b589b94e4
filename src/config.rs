//! Test configuration and its validation.
//!
//! [`Config`] collects the raw parameters through builder methods;
//! [`Config::validate`] checks every constraint and produces the immutable
//! [`TestConfiguration`] the planner and evaluator work from.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_PLANNED_LOOKS, DEFAULT_SCHEDULE_JITTER, DEFAULT_SEED,
};
use crate::error::ConfigurationError;
use crate::rng::hash_seed;
use crate::types::MetricKind;

/// Raw configuration for a sequential test.
///
/// # Example
///
/// ```
/// use basemath::Config;
///
/// let config = Config::binary(0.10, 0.01)
///     .alpha(0.05)
///     .beta(0.2)
///     .seed("checkout-button-color");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // =========================================================================
    // Metric
    // =========================================================================
    /// Metric kind, carrying the variance for continuous metrics.
    pub metric: MetricKind,

    /// Estimated mean of the metric in the control arm.
    ///
    /// The conversion rate for binary metrics, the mean value per visitor
    /// (including non-converting visitors as zero) for continuous metrics.
    pub baseline_estimate: f64,

    /// Minimum relative uplift the test should detect.
    ///
    /// A 1% uplift is passed as 0.01. Values of 1 or more (a 100%+ uplift)
    /// are allowed.
    pub mde: f64,

    // =========================================================================
    // Error budgets
    // =========================================================================
    /// Type I error: probability of declaring superiority when there is no
    /// uplift. Default: 0.05.
    pub alpha: f64,

    /// Type II error: probability of missing an uplift of at least the MDE.
    /// Default: 0.2.
    pub beta: f64,

    // =========================================================================
    // Reproducibility and scheduling
    // =========================================================================
    /// Seed string, ideally the experiment's name or key.
    ///
    /// Evaluating the same data with the same seed always gives the same
    /// decisions.
    pub seed: String,

    /// Number of planned looks, including the final one. Default: 10.
    ///
    /// Only the reported schedule depends on this; the boundaries are
    /// continuous in the information fraction.
    pub planned_looks: usize,

    /// Jitter of interior look positions, as a fraction of the look spacing.
    /// Default: 0.5 (each interior look moves by at most a quarter spacing).
    pub schedule_jitter: f64,
}

impl Config {
    /// Configuration for a binary (conversion) metric.
    pub fn binary(baseline_estimate: f64, mde: f64) -> Self {
        Self::with_metric(MetricKind::Binary, baseline_estimate, mde)
    }

    /// Configuration for a continuous metric with a known control variance.
    pub fn continuous(baseline_estimate: f64, mde: f64, variance: f64) -> Self {
        Self::with_metric(MetricKind::Continuous { variance }, baseline_estimate, mde)
    }

    /// Binary when `variance` is `None`, continuous otherwise.
    pub fn from_estimates(baseline_estimate: f64, mde: f64, variance: Option<f64>) -> Self {
        match variance {
            Some(variance) => Self::continuous(baseline_estimate, mde, variance),
            None => Self::binary(baseline_estimate, mde),
        }
    }

    fn with_metric(metric: MetricKind, baseline_estimate: f64, mde: f64) -> Self {
        Self {
            metric,
            baseline_estimate,
            mde,
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            seed: DEFAULT_SEED.to_string(),
            planned_looks: DEFAULT_PLANNED_LOOKS,
            schedule_jitter: DEFAULT_SCHEDULE_JITTER,
        }
    }

    /// Set the Type I error budget.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the Type II error budget.
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set the seed string.
    pub fn seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Set the number of planned looks.
    pub fn planned_looks(mut self, looks: usize) -> Self {
        self.planned_looks = looks;
        self
    }

    /// Set the schedule jitter. Use 0.0 for evenly spaced looks.
    pub fn schedule_jitter(mut self, jitter: f64) -> Self {
        self.schedule_jitter = jitter;
        self
    }

    /// Check all constraints and derive the hypothesis model.
    pub fn validate(&self) -> Result<TestConfiguration, ConfigurationError> {
        for (value, err) in [
            (self.alpha, ConfigurationError::InvalidAlpha(self.alpha)),
            (self.beta, ConfigurationError::InvalidBeta(self.beta)),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(err);
            }
        }
        if !(self.mde > 0.0 && self.mde.is_finite()) {
            return Err(ConfigurationError::InvalidMde(self.mde));
        }
        if !(self.baseline_estimate > 0.0 && self.baseline_estimate.is_finite()) {
            return Err(ConfigurationError::InvalidBaseline {
                value: self.baseline_estimate,
                reason: "must be positive and finite",
            });
        }
        if self.planned_looks == 0 {
            return Err(ConfigurationError::InvalidPlannedLooks(self.planned_looks));
        }
        if !(0.0..1.0).contains(&self.schedule_jitter) {
            return Err(ConfigurationError::InvalidScheduleJitter(self.schedule_jitter));
        }

        let baseline = self.baseline_estimate;
        let treatment = baseline * (1.0 + self.mde);

        let (baseline_variance, treatment_variance) = match self.metric {
            MetricKind::Binary => {
                if baseline >= 1.0 {
                    return Err(ConfigurationError::InvalidBaseline {
                        value: baseline,
                        reason: "a binary metric needs a rate in (0, 1); \
                                 pass a variance for continuous metrics",
                    });
                }
                if treatment > 1.0 {
                    return Err(ConfigurationError::EffectExceedsUnity {
                        baseline,
                        treatment,
                    });
                }
                (baseline * (1.0 - baseline), treatment * (1.0 - treatment))
            }
            MetricKind::Continuous { variance } => {
                if !(variance > 0.0 && variance.is_finite()) {
                    return Err(ConfigurationError::InvalidVariance(variance));
                }
                (variance, variance)
            }
        };

        Ok(TestConfiguration {
            metric: self.metric,
            baseline_estimate: baseline,
            treatment_estimate: treatment,
            baseline_variance,
            treatment_variance,
            mde: self.mde,
            alpha: self.alpha,
            beta: self.beta,
            seed: self.seed.clone(),
            numeric_seed: hash_seed(&self.seed),
            planned_looks: self.planned_looks,
            schedule_jitter: self.schedule_jitter,
        })
    }
}

/// Validated, immutable configuration.
///
/// Built only through [`Config::validate`], so every field is finite and in
/// range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfiguration {
    /// Metric kind.
    pub metric: MetricKind,
    /// Control mean.
    pub baseline_estimate: f64,
    /// Treatment mean under the alternative: baseline × (1 + mde).
    pub treatment_estimate: f64,
    /// Control variance (Bernoulli variance for binary metrics).
    pub baseline_variance: f64,
    /// Treatment variance under the alternative.
    pub treatment_variance: f64,
    /// Relative minimum detectable effect.
    pub mde: f64,
    /// Type I error budget.
    pub alpha: f64,
    /// Type II error budget.
    pub beta: f64,
    /// Seed string as supplied.
    pub seed: String,
    /// Numeric seed derived from the seed string.
    pub numeric_seed: u64,
    /// Number of planned looks.
    pub planned_looks: usize,
    /// Jitter of interior look positions.
    pub schedule_jitter: f64,
}

impl TestConfiguration {
    /// Absolute effect per sample under the alternative.
    pub fn drift(&self) -> f64 {
        self.treatment_estimate - self.baseline_estimate
    }

    /// Variance rate of the treatment-minus-control sum under the null.
    pub fn variance_null(&self) -> f64 {
        2.0 * self.baseline_variance
    }

    /// Variance rate of the treatment-minus-control sum under the alternative.
    pub fn variance_alternative(&self) -> f64 {
        self.baseline_variance + self.treatment_variance
    }

    /// Variance rate used for crossings between looks: the larger of the
    /// null and alternative rates.
    ///
    /// A binary treatment closer to 0 or 1 than the control has the smaller
    /// alternative rate, and judging crossings with it would miss some that
    /// happen under the null.
    pub fn variance_crossing(&self) -> f64 {
        self.variance_null().max(self.variance_alternative())
    }
}
