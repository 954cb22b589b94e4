//! Maximum sample size for the sequential test.
//!
//! The treatment-minus-control outcome sum S_n is modelled as a Brownian
//! motion in the per-arm sample count n:
//!
//! ```text
//! H0: drift 0, variance rate v0 = 2·var_A
//! H1: drift δ, variance rate v1 = var_A + var_B
//! ```
//!
//! The test stops for futility the first time S_n falls to the line
//! `D + δ·n`. Between looks the path is unobserved, and a crossing is judged
//! with the rate `vc = max(v0, v1)`. Under H0 that is never smaller than the
//! true rate, so superiority is declared at most as often as under
//! continuous monitoring. Under H1 it can overstate crossings when v1 < v0,
//! and `D` is widened to absorb that (see [`futility_quantile`]).
//!
//! The horizon N is then the smallest value at which the probability of
//! never touching the line under H0 has dropped to α. That survival
//! probability has the closed Bachelier–Lévy form, so N comes from a
//! one-dimensional bracketed bisection rather than from integrating a
//! first-passage density.

use crate::config::TestConfiguration;
use crate::constants::{
    BISECTION_RELATIVE_TOLERANCE, MAX_BISECTION_ITERATIONS, MAX_REQUIRED_SAMPLES,
};
use crate::error::ConfigurationError;
use crate::math::{normal_cdf, path_sd, probit, sq, weighted_normal_cdf, whole_samples};

/// Result of the sample size search.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSize {
    /// Per-arm samples at which the test must conclude.
    pub required: u64,
    /// Per-arm samples of the equivalent single-look test.
    pub fixed_horizon: u64,
    /// Continuous root of the survival equation, before rounding up.
    pub root: f64,
}

/// Probability under H1 that a single look at the horizon stops for
/// futility, for a line `x` standard deviations below the expected path.
///
/// `variance_ratio` is `r = v1 / vc`, in [1/2, 1]:
///
/// ```text
/// F(x) = Φ(-x) + exp(-2r(1-r)·x²)·Φ((1-2r)·x)
/// ```
///
/// The first term ends below the line, the second is the bridge crossing
/// probability averaged over the end points above it. For r = 1 this is the
/// reflection-principle value 2Φ(-x). More looks observe the path more
/// closely and only bring the probability down towards 2Φ(-x).
pub fn single_look_futility_probability(x: f64, variance_ratio: f64) -> f64 {
    let r = variance_ratio;
    let below = normal_cdf(-x);
    let crossed = weighted_normal_cdf(-2.0 * r * (1.0 - r) * x * x, (1.0 - 2.0 * r) * x);
    (below + crossed).min(1.0)
}

/// Multiple x of `√(v1·N)` that places the futility line, `D = -x·√(v1·N)`.
///
/// Solves `F(x) = β` for [`single_look_futility_probability`], which is
/// strictly decreasing in x from 1 at x = 0. With equal crossing and
/// alternative rates the root is `z_{1-β/2}` exactly.
pub fn futility_quantile(variance_ratio: f64, beta: f64) -> f64 {
    if variance_ratio >= 1.0 {
        return probit(1.0 - beta / 2.0);
    }
    let futility = |x: f64| single_look_futility_probability(x, variance_ratio);

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    // F(64) is far below any representable β
    while futility(hi) > beta && hi < 64.0 {
        lo = hi;
        hi *= 2.0;
    }
    for _ in 0..MAX_BISECTION_ITERATIONS {
        if hi - lo <= BISECTION_RELATIVE_TOLERANCE * hi {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if futility(mid) > beta {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi
}

/// Intercept D of the futility line for a horizon of `samples` per arm.
///
/// Negative: the line starts below zero and rises with slope δ.
pub fn futility_intercept(samples: f64, config: &TestConfiguration) -> f64 {
    let v1 = config.variance_alternative();
    let ratio = v1 / config.variance_crossing();
    -path_sd(v1, samples) * futility_quantile(ratio, config.beta)
}

/// Probability under H0 that the outcome path never touches the futility
/// line over `samples` per arm, with the line's intercept set for that same
/// horizon.
///
/// This is the probability of ending with a superiority decision when there
/// is no uplift, however the samples are batched.
pub fn null_survival_probability(samples: f64, config: &TestConfiguration) -> f64 {
    let drift = config.drift();
    let v0 = config.variance_null();
    let a = -futility_intercept(samples, config);
    let scale = path_sd(v0, samples);

    let stays_above = normal_cdf((a - drift * samples) / scale);
    let reflected = weighted_normal_cdf(2.0 * drift * a / v0, (-a - drift * samples) / scale);

    (stays_above - reflected).clamp(0.0, 1.0)
}

/// Per-arm sample size of a one-sided, single-look two-sample z-test with
/// the same α, β and effect.
pub fn fixed_horizon_samples(config: &TestConfiguration) -> f64 {
    let z_alpha = probit(1.0 - config.alpha);
    let z_beta = probit(1.0 - config.beta);
    let v0 = config.variance_null();
    let v1 = config.variance_alternative();
    sq((z_alpha * path_sd(v0, 1.0) + z_beta * path_sd(v1, 1.0)) / config.drift())
}

/// Smallest per-arm sample size whose null survival probability is ≤ α.
///
/// The search doubles an upper bracket from one sample up to
/// [`MAX_REQUIRED_SAMPLES`] and then bisects, so it always terminates.
pub fn required_samples(config: &TestConfiguration) -> Result<SampleSize, ConfigurationError> {
    let alpha = config.alpha;
    let survival = |n: f64| -> Result<f64, ConfigurationError> {
        let p = null_survival_probability(n, config);
        if p.is_finite() {
            Ok(p)
        } else {
            Err(ConfigurationError::NonFiniteSampleSize)
        }
    };

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    while survival(hi)? > alpha {
        lo = hi;
        hi *= 2.0;
        if hi > MAX_REQUIRED_SAMPLES {
            return Err(ConfigurationError::SampleSizeUnbounded {
                cap: MAX_REQUIRED_SAMPLES,
            });
        }
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        if hi - lo <= BISECTION_RELATIVE_TOLERANCE * hi {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if survival(mid)? > alpha {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let fixed = fixed_horizon_samples(config);
    if !fixed.is_finite() {
        return Err(ConfigurationError::NonFiniteSampleSize);
    }

    Ok(SampleSize {
        required: whole_samples(hi).max(1),
        fixed_horizon: whole_samples(fixed).max(1),
        root: hi,
    })
}
