//! Boundary plan: horizon, look schedule and per-look decision boundaries.
//!
//! Boundaries live in standardized space, `Z = S_n / √(v0·n)`:
//!
//! ```text
//! futility  f(t) = (D + δ·tN) / √(v0·tN)        rises from -∞ towards c
//! efficacy  e(t) = c / √t   (c > 0)             falls from +∞ towards c
//! terminal  c    = f(1)
//! ```
//!
//! Both are continuous in the information fraction t, so a batch that lands
//! between two planned looks is judged at its own t. The planned looks are a
//! schedule for the caller; jittering them with the seed changes when looks
//! are expected, never what a given amount of data decides.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TestConfiguration;
use crate::error::ConfigurationError;
use crate::math::{path_sd, whole_samples};
use crate::rng::{SeededGenerator, Stream};

use super::sample_size::{futility_intercept, required_samples};

/// One planned interim look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Look {
    /// 1-based position in the schedule.
    pub look_index: usize,

    /// Planned cumulative per-arm samples divided by the horizon, in (0, 1].
    pub information_fraction: f64,

    /// Planned cumulative per-arm samples at this look.
    pub planned_samples: u64,

    /// Standardized statistic at or above which the null would be rejected.
    ///
    /// Superiority is only ever declared at the final look; earlier values
    /// show how far the statistic is from a conclusive result.
    pub efficacy_boundary: f64,

    /// Standardized statistic at or below which the test stops for futility.
    pub futility_boundary: f64,
}

/// Horizon and boundaries, computed once per test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPlan {
    /// Per-arm samples at which the test must conclude.
    pub max_samples_per_arm: u64,

    /// Per-arm samples of the equivalent single-look test.
    pub fixed_horizon_samples: u64,

    /// `max_samples_per_arm / fixed_horizon_samples`.
    pub inflation_factor: f64,

    /// Intercept D of the futility line, in outcome-delta units (negative).
    pub intercept: f64,

    /// Slope δ of the futility line: absolute effect per sample under H1.
    pub drift: f64,

    /// Variance rate of the outcome delta under H0.
    pub variance_null: f64,

    /// Variance rate of the outcome delta under H1.
    pub variance_alternative: f64,

    /// Variance rate used for crossings between looks, the larger of the
    /// two above.
    pub variance_crossing: f64,

    /// Efficacy and futility boundary at the final look.
    pub terminal_critical_value: f64,

    /// Planned looks in increasing order; the last has fraction 1.
    pub looks: Vec<Look>,
}

impl BoundaryPlan {
    /// Information fraction reached after `samples` per arm, capped at 1.
    pub fn information_fraction(&self, samples: u64) -> f64 {
        (samples as f64 / self.max_samples_per_arm as f64).min(1.0)
    }

    /// Outcome delta at or below which the path has reached the futility
    /// line after `samples` per arm.
    pub fn futility_threshold(&self, samples: f64) -> f64 {
        self.intercept + self.drift * samples
    }

    /// Futility boundary at information fraction `t`.
    ///
    /// Negative infinity at t = 0, where no statistic exists.
    pub fn futility_boundary_at(&self, t: f64) -> f64 {
        let n = t * self.max_samples_per_arm as f64;
        if n <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.futility_threshold(n) / path_sd(self.variance_null, n)
    }

    /// Efficacy boundary at information fraction `t`.
    pub fn efficacy_boundary_at(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return f64::INFINITY;
        }
        let c = self.terminal_critical_value;
        if c > 0.0 {
            c / libm::sqrt(t.min(1.0))
        } else {
            c
        }
    }

    /// Standardized statistic for a cumulative outcome delta.
    ///
    /// `None` before any samples have been seen.
    pub fn statistic(&self, outcome_delta: f64, samples: u64) -> Option<f64> {
        if samples == 0 {
            return None;
        }
        Some(outcome_delta / path_sd(self.variance_null, samples as f64))
    }

    /// The look a cumulative sample count belongs to.
    ///
    /// The smallest planned look whose planned samples are at least
    /// `samples`; counts between two looks map to the later one, counts
    /// at or past the horizon map to the final look. The result is
    /// non-decreasing in `samples`, so successive calls can share a look or
    /// pass over several, but never go back.
    pub fn look_for_samples(&self, samples: u64) -> &Look {
        let idx = self
            .looks
            .partition_point(|look| look.planned_samples < samples)
            .min(self.looks.len() - 1);
        &self.looks[idx]
    }

    /// The final look (fraction 1).
    pub fn final_look(&self) -> &Look {
        &self.looks[self.looks.len() - 1]
    }

    /// Number of planned looks.
    pub fn num_looks(&self) -> usize {
        self.looks.len()
    }
}

/// Compute the boundary plan for a validated configuration.
pub fn plan(config: &TestConfiguration) -> Result<BoundaryPlan, ConfigurationError> {
    let size = required_samples(config)?;
    let max_samples = size.required;

    let mut plan = BoundaryPlan {
        max_samples_per_arm: max_samples,
        fixed_horizon_samples: size.fixed_horizon,
        inflation_factor: max_samples as f64 / size.fixed_horizon as f64,
        intercept: futility_intercept(max_samples as f64, config),
        drift: config.drift(),
        variance_null: config.variance_null(),
        variance_alternative: config.variance_alternative(),
        variance_crossing: config.variance_crossing(),
        terminal_critical_value: 0.0,
        looks: Vec::new(),
    };
    plan.terminal_critical_value = plan.futility_boundary_at(1.0);

    let schedule = look_schedule(
        max_samples,
        config.planned_looks,
        config.schedule_jitter,
        &mut SeededGenerator::new(config.numeric_seed, Stream::Schedule),
    );
    let last = schedule.len();
    plan.looks = schedule
        .into_iter()
        .enumerate()
        .map(|(i, planned_samples)| {
            let t = plan.information_fraction(planned_samples);
            let (efficacy, futility) = if i + 1 == last {
                (plan.terminal_critical_value, plan.terminal_critical_value)
            } else {
                (plan.efficacy_boundary_at(t), plan.futility_boundary_at(t))
            };
            Look {
                look_index: i + 1,
                information_fraction: t,
                planned_samples,
                efficacy_boundary: efficacy,
                futility_boundary: futility,
            }
        })
        .collect();

    debug!(
        max_samples_per_arm = plan.max_samples_per_arm,
        fixed_horizon_samples = plan.fixed_horizon_samples,
        inflation_factor = plan.inflation_factor,
        terminal_critical_value = plan.terminal_critical_value,
        looks = plan.looks.len(),
        "boundary plan computed"
    );

    Ok(plan)
}

/// Planned cumulative sample counts, strictly increasing, ending at
/// `max_samples`.
///
/// Looks are evenly spaced, then each interior look is shifted by up to
/// `±jitter/2` of the spacing. There are never more looks than samples.
fn look_schedule(
    max_samples: u64,
    planned_looks: usize,
    jitter: f64,
    generator: &mut SeededGenerator,
) -> Vec<u64> {
    let looks = (planned_looks as u64).min(max_samples).max(1);
    let mut schedule = Vec::with_capacity(looks as usize);
    let mut previous = 0u64;

    for k in 1..=looks {
        let planned = if k == looks {
            max_samples
        } else {
            let offset = if jitter > 0.0 {
                jitter * (generator.next_uniform() - 0.5)
            } else {
                0.0
            };
            let raw = whole_samples((k as f64 + offset) / looks as f64 * max_samples as f64);
            // Leave room for one sample per remaining look
            raw.clamp(previous + 1, max_samples - (looks - k))
        };
        schedule.push(planned);
        previous = planned;
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn plan_for(config: Config) -> BoundaryPlan {
        plan(&config.validate().unwrap()).unwrap()
    }

    #[test]
    fn test_final_look_is_horizon() {
        let p = plan_for(Config::binary(0.1, 0.05).seed("exp1"));
        let last = p.final_look();
        assert_eq!(last.planned_samples, p.max_samples_per_arm);
        assert_eq!(last.information_fraction, 1.0);
        assert_eq!(last.efficacy_boundary, last.futility_boundary);
        assert!(last.efficacy_boundary.is_finite());
        assert_eq!(p.num_looks(), 10);
    }

    #[test]
    fn test_boundaries_monotone() {
        let p = plan_for(Config::continuous(1.0, 0.1, 1.0).seed("shape"));
        for pair in p.looks.windows(2) {
            assert!(pair[0].information_fraction < pair[1].information_fraction);
            assert!(pair[0].planned_samples < pair[1].planned_samples);
            assert!(pair[0].futility_boundary <= pair[1].futility_boundary);
            assert!(pair[0].efficacy_boundary >= pair[1].efficacy_boundary);
        }
    }

    #[test]
    fn test_early_futility_is_lenient() {
        let p = plan_for(Config::binary(0.1, 0.05));
        let first = &p.looks[0];
        assert!(first.futility_boundary < p.terminal_critical_value - 1.0);
        assert!(first.efficacy_boundary > p.terminal_critical_value * 2.0);
    }

    #[test]
    fn test_small_horizon_caps_looks() {
        // 0.6 / 0.5 needs only 34 samples per arm
        let p = plan_for(Config::binary(0.6, 0.5).planned_looks(50));
        assert_eq!(p.max_samples_per_arm, 34);
        assert_eq!(p.num_looks(), 34);
        let counts: Vec<u64> = p.looks.iter().map(|l| l.planned_samples).collect();
        assert_eq!(counts, (1..=34).collect::<Vec<u64>>());
    }

    #[test]
    fn test_single_look() {
        let p = plan_for(Config::binary(0.1, 0.05).planned_looks(1));
        assert_eq!(p.num_looks(), 1);
        assert_eq!(p.looks[0].planned_samples, p.max_samples_per_arm);
    }

    #[test]
    fn test_unjittered_schedule_is_even() {
        let config = Config::continuous(1.0, 0.1, 1.0).schedule_jitter(0.0);
        let p = plan_for(config.planned_looks(4));
        let n = p.max_samples_per_arm as f64;
        for (k, look) in p.looks.iter().enumerate() {
            let expected = whole_samples((k + 1) as f64 / 4.0 * n);
            assert_eq!(look.planned_samples, expected.min(p.max_samples_per_arm));
        }
    }

    #[test]
    fn test_seed_moves_looks_not_horizon() {
        let a = plan_for(Config::binary(0.1, 0.05).seed("a"));
        let b = plan_for(Config::binary(0.1, 0.05).seed("b"));
        assert_eq!(a.max_samples_per_arm, b.max_samples_per_arm);
        assert_eq!(a.terminal_critical_value, b.terminal_critical_value);
        let a_counts: Vec<u64> = a.looks.iter().map(|l| l.planned_samples).collect();
        let b_counts: Vec<u64> = b.looks.iter().map(|l| l.planned_samples).collect();
        assert_ne!(a_counts, b_counts);
    }

    #[test]
    fn test_look_for_samples() {
        let p = plan_for(Config::binary(0.1, 0.05).schedule_jitter(0.0));
        let third = &p.looks[2];
        let fourth = &p.looks[3];
        assert_eq!(p.look_for_samples(third.planned_samples).look_index, 3);
        assert_eq!(p.look_for_samples(third.planned_samples + 1).look_index, 4);
        assert_eq!(p.look_for_samples(fourth.planned_samples).look_index, 4);
        assert_eq!(p.look_for_samples(0).look_index, 1);
        assert_eq!(
            p.look_for_samples(p.max_samples_per_arm * 2).look_index,
            p.num_looks()
        );
    }

    #[test]
    fn test_futility_threshold_matches_boundary() {
        let p = plan_for(Config::binary(0.3, 0.2));
        let n = 0.4 * p.max_samples_per_arm as f64;
        let z = p.futility_boundary_at(0.4);
        let delta = p.futility_threshold(n);
        assert!((z * path_sd(p.variance_null, n) - delta).abs() < 1e-9);
        assert_eq!(p.futility_boundary_at(0.0), f64::NEG_INFINITY);
        assert!(p.statistic(1.0, 0).is_none());
    }
}
