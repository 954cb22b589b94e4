//! Tests for configuration validation.
//!
//! These tests verify that invalid parameters are rejected when a test is
//! constructed, with an error naming the violated constraint.

use basemath::{Config, ConfigurationError, SequentialTest};

const OUT_OF_BOUNDS: [f64; 4] = [-0.05, 0.0, 1.0, 1.01];

// =============================================================================
// ERROR BUDGETS
// =============================================================================

#[test]
fn alpha_out_of_bounds_rejected() {
    for value in OUT_OF_BOUNDS {
        let err = SequentialTest::new(&Config::binary(0.1, 0.01).alpha(value)).unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidAlpha(value));
        assert!(err.to_string().contains("alpha must be in (0, 1)"));
    }
}

#[test]
fn beta_out_of_bounds_rejected() {
    for value in OUT_OF_BOUNDS {
        let err = SequentialTest::new(&Config::binary(0.1, 0.01).beta(value)).unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidBeta(value));
    }
}

#[test]
fn extreme_but_valid_budgets_accepted() {
    let test = SequentialTest::new(&Config::binary(0.3, 0.9).alpha(0.9).beta(0.01)).unwrap();
    assert_eq!(test.required_samples(), 9);
}

// =============================================================================
// BASELINE AND EFFECT
// =============================================================================

#[test]
fn binary_baseline_out_of_bounds_rejected() {
    for value in OUT_OF_BOUNDS {
        let err = SequentialTest::new(&Config::binary(value, 0.01)).unwrap_err();
        assert!(
            matches!(err, ConfigurationError::InvalidBaseline { .. }),
            "baseline {} gave {:?}",
            value,
            err
        );
    }
}

#[test]
fn mde_must_be_positive() {
    for value in [0.0, -0.1, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            SequentialTest::new(&Config::binary(0.1, value)),
            Err(ConfigurationError::InvalidMde(_))
        ));
    }
}

#[test]
fn mde_of_one_or_more_is_allowed() {
    assert_eq!(
        SequentialTest::new(&Config::binary(0.01, 3.0))
            .unwrap()
            .required_samples(),
        261
    );
    assert!(SequentialTest::new(&Config::binary(0.3, 1.0)).is_ok());
}

#[test]
fn binary_effect_over_unity_rejected() {
    let err = SequentialTest::new(&Config::binary(0.9, 0.2)).unwrap_err();
    assert!(err
        .to_string()
        .contains("cannot detect an effect that brings a binary metric over 100%"));
}

#[test]
fn binary_effect_reaching_exactly_one_accepted() {
    // 0.5 * (1 + 1) = 1.0 exactly
    assert!(Config::binary(0.5, 1.0).validate().is_ok());
}

// =============================================================================
// CONTINUOUS METRICS
// =============================================================================

#[test]
fn continuous_variance_must_be_positive() {
    for value in [0.0, -1.0, f64::NAN] {
        assert!(matches!(
            SequentialTest::new(&Config::continuous(1.0, 0.1, value)),
            Err(ConfigurationError::InvalidVariance(_))
        ));
    }
}

#[test]
fn continuous_baseline_above_one_accepted() {
    let config = Config::continuous(42.0, 0.05, 900.0);
    assert!(SequentialTest::new(&config).is_ok());
}

#[test]
fn continuous_baseline_must_be_positive() {
    assert!(matches!(
        SequentialTest::new(&Config::continuous(0.0, 0.1, 1.0)),
        Err(ConfigurationError::InvalidBaseline { .. })
    ));
}

// =============================================================================
// SCHEDULING
// =============================================================================

#[test]
fn zero_planned_looks_rejected() {
    let config = Config::binary(0.1, 0.05).planned_looks(0);
    assert_eq!(
        config.validate().unwrap_err(),
        ConfigurationError::InvalidPlannedLooks(0)
    );
}

#[test]
fn schedule_jitter_range() {
    let config = Config::binary(0.1, 0.05);
    for jitter in [0.0, 0.5, 0.99] {
        assert!(config.clone().schedule_jitter(jitter).validate().is_ok());
    }
    for jitter in [1.0, -0.1, f64::NAN] {
        assert!(config.clone().schedule_jitter(jitter).validate().is_err());
    }
}

// =============================================================================
// UNREACHABLE DESIGNS
// =============================================================================

#[test]
fn unbounded_sample_size_is_an_error() {
    let err = SequentialTest::new(&Config::continuous(1.0, 1e-9, 100.0)).unwrap_err();
    assert!(matches!(err, ConfigurationError::SampleSizeUnbounded { .. }));
    assert!(err.to_string().contains("increase the MDE"));
}
