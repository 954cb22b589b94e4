//! Special functions used by the planner and the evaluator.
//!
//! Every transcendental call goes through `libm`. The helpers here are the
//! few shapes the boundary formulas keep repeating: a path's spread after n
//! samples, whole-sample rounding and the normal distribution.

use crate::constants::LOG_2PI;

/// Standard deviation of the outcome sum after `samples` per arm, for a path
/// with variance rate `variance`.
#[inline]
pub fn path_sd(variance: f64, samples: f64) -> f64 {
    libm::sqrt(variance * samples)
}

/// Rounds a continuous sample count up to whole samples.
///
/// Negative counts saturate to 0.
#[inline]
pub fn whole_samples(samples: f64) -> u64 {
    libm::ceil(samples) as u64
}

/// `e^log_weight · Φ(x)`, summed in log space.
///
/// The reflection terms pair a weight that can overflow with a tail that
/// underflows; their product is still representable.
pub fn weighted_normal_cdf(log_weight: f64, x: f64) -> f64 {
    libm::exp(log_weight + ln_normal_cdf(x))
}

/// Square (x^2).
#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Standard normal CDF: Φ(x) = erfc(-x/√2) / 2
///
/// Written with `erfc` rather than `1 + erf` so the lower tail keeps its
/// relative precision.
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x * core::f64::consts::FRAC_1_SQRT_2)
}

/// Natural log of the standard normal CDF.
///
/// Below x = -37 `erfc` underflows, so the Mills-ratio expansion takes over.
pub fn ln_normal_cdf(x: f64) -> f64 {
    if x > -37.0 {
        return libm::log(normal_cdf(x));
    }
    let x2 = sq(x);
    let series = 1.0 - 1.0 / x2 + 3.0 / sq(x2) - 15.0 / (x2 * sq(x2));
    -0.5 * x2 - libm::log(-x) - 0.5 * LOG_2PI + libm::log(series)
}

/// Inverse normal CDF (probit function).
///
/// Acklam's rational approximation (relative error ~1.2e-9) followed by one
/// Halley step against `normal_cdf`, which brings it to machine precision.
/// Sample sizes scale with the square of this quantile.
pub fn probit(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];
    const P_LOW: f64 = 0.02425;

    let x = if p < P_LOW {
        let q = libm::sqrt(-2.0 * libm::log(p));
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = libm::sqrt(-2.0 * libm::log(1.0 - p));
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    // Halley refinement
    let e = normal_cdf(x) - p;
    let u = e * libm::exp(0.5 * (LOG_2PI + sq(x)));
    x - u / (1.0 + 0.5 * x * u)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_reference_values() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((normal_cdf(1.96) - 0.9750021048517795).abs() < 1e-12);
        assert!((normal_cdf(-1.0) - 0.15865525393145707).abs() < 1e-12);
    }

    #[test]
    fn test_probit_accuracy() {
        assert!(probit(0.5).abs() < 1e-12, "probit(0.5) should be 0");
        assert!((probit(0.975) - 1.959963984540054).abs() < 1e-9);
        assert!((probit(0.95) - 1.6448536269514722).abs() < 1e-9);
        assert!((probit(0.9) - 1.2815515655446004).abs() < 1e-9);
        assert!((probit(0.025) + 1.959963984540054).abs() < 1e-9);
        assert!((probit(1e-10) + 6.361340902404056).abs() < 1e-7);
    }

    #[test]
    fn test_probit_inverts_cdf() {
        for &p in &[1e-6, 0.01, 0.2, 0.5, 0.8, 0.99, 1.0 - 1e-6] {
            let back = normal_cdf(probit(p));
            assert!(
                ((back - p) / p).abs() < 1e-10,
                "Φ(Φ⁻¹({})) = {}, expected {}",
                p,
                back,
                p
            );
        }
    }

    #[test]
    fn test_probit_edges() {
        assert_eq!(probit(0.0), f64::NEG_INFINITY);
        assert_eq!(probit(1.0), f64::INFINITY);
        assert!(probit(f64::NAN).is_nan());
    }

    #[test]
    fn test_ln_normal_cdf_matches_direct_and_tail() {
        for &x in &[-5.0, -1.0, 0.0, 2.0] {
            assert!((ln_normal_cdf(x) - normal_cdf(x).ln()).abs() < 1e-12);
        }
        // Continuity across the switch to the asymptotic branch
        let left = ln_normal_cdf(-37.0 - 1e-9);
        let right = ln_normal_cdf(-37.0 + 1e-9);
        assert!((left - right).abs() < 1e-6, "{} vs {}", left, right);
        // Deep tail stays finite
        assert!(ln_normal_cdf(-200.0).is_finite());
        assert!(ln_normal_cdf(-200.0) < -19_000.0);
    }

    #[test]
    fn test_path_sd_and_whole_samples() {
        assert!((path_sd(2.0, 8.0) - 4.0).abs() < 1e-15);
        assert_eq!(path_sd(0.5, 0.0), 0.0);
        assert_eq!(whole_samples(14.0), 14);
        assert_eq!(whole_samples(14.000001), 15);
        assert_eq!(whole_samples(-3.0), 0);
    }

    #[test]
    fn test_weighted_normal_cdf_survives_extreme_weights() {
        let direct = 3.0f64.exp() * normal_cdf(-1.5);
        assert!((weighted_normal_cdf(3.0, -1.5) - direct).abs() < 1e-12);
        // e^800 overflows on its own
        let p = weighted_normal_cdf(800.0, -40.0);
        assert!(p.is_finite() && p > 0.0 && p < 1.0, "{}", p);
    }
}
