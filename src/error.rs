//! Error types for test construction and batch evaluation.

use std::fmt;

/// Invalid or inconsistent construction parameters.
///
/// Returned when validating a [`Config`](crate::Config), when planning
/// boundaries, or when restoring a persisted state.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Alpha outside (0, 1).
    InvalidAlpha(f64),

    /// Beta outside (0, 1).
    InvalidBeta(f64),

    /// Minimum detectable effect not strictly positive and finite.
    InvalidMde(f64),

    /// Baseline estimate outside the valid range for the metric kind.
    InvalidBaseline {
        /// The rejected value.
        value: f64,
        /// Which range was violated.
        reason: &'static str,
    },

    /// Binary metric whose baseline plus uplift exceeds 100%.
    EffectExceedsUnity {
        /// Baseline rate.
        baseline: f64,
        /// Rate implied by the MDE.
        treatment: f64,
    },

    /// Continuous variance missing, non-finite or not positive.
    InvalidVariance(f64),

    /// Zero planned looks.
    InvalidPlannedLooks(usize),

    /// Schedule jitter outside [0, 1).
    InvalidScheduleJitter(f64),

    /// No sample size up to the search cap meets the error budgets.
    SampleSizeUnbounded {
        /// Largest per-arm sample size that was tried.
        cap: f64,
    },

    /// The sample size computation produced a non-finite value.
    NonFiniteSampleSize,

    /// A persisted evaluation state does not fit this configuration.
    StateMismatch {
        /// What did not match.
        message: String,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAlpha(v) => write!(f, "alpha must be in (0, 1), got {}", v),
            Self::InvalidBeta(v) => write!(f, "beta must be in (0, 1), got {}", v),
            Self::InvalidMde(v) => write!(
                f,
                "the minimum detectable effect must be positive, got {}",
                v
            ),
            Self::InvalidBaseline { value, reason } => {
                write!(f, "invalid baseline estimate {}: {}", value, reason)
            }
            Self::EffectExceedsUnity {
                baseline,
                treatment,
            } => write!(
                f,
                "cannot detect an effect that brings a binary metric over 100% \
                 (baseline {}, treatment {})",
                baseline, treatment
            ),
            Self::InvalidVariance(v) => {
                write!(f, "variance must be positive and finite, got {}", v)
            }
            Self::InvalidPlannedLooks(n) => {
                write!(f, "planned_looks must be at least 1, got {}", n)
            }
            Self::InvalidScheduleJitter(v) => {
                write!(f, "schedule_jitter must be in [0, 1), got {}", v)
            }
            Self::SampleSizeUnbounded { cap } => write!(
                f,
                "no sample size up to {:.0} per arm meets the error budgets; \
                 increase the MDE or relax alpha/beta",
                cap
            ),
            Self::NonFiniteSampleSize => {
                write!(f, "sample size computation produced a non-finite value")
            }
            Self::StateMismatch { message } => write!(
                f,
                "evaluation state does not match configuration: {}",
                message
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// A batch passed to the evaluation step was rejected.
///
/// The engine never corrects input silently; state is left untouched when
/// this is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidBatchError {
    /// An outcome delta was NaN or infinite.
    NonFiniteOutcome {
        /// Which argument was non-finite.
        field: &'static str,
        /// The value received.
        value: f64,
    },

    /// The previous sample count went backwards.
    NonMonotonicSamples {
        /// Cumulative count held by the test.
        expected: u64,
        /// Count supplied by the caller.
        received: u64,
    },

    /// The previous sample count skips ahead of what the test has seen.
    SampleHistoryMismatch {
        /// Cumulative count held by the test.
        expected: u64,
        /// Count supplied by the caller.
        received: u64,
    },

    /// The previous outcome delta disagrees with the stored cumulative delta.
    OutcomeHistoryMismatch {
        /// Cumulative delta held by the test.
        expected: f64,
        /// Delta supplied by the caller.
        received: f64,
    },

    /// A binary batch reports more successes than samples.
    OutcomeExceedsSamples {
        /// Outcome delta in the batch.
        outcome_delta: f64,
        /// Samples in the batch.
        samples: u64,
    },
}

impl fmt::Display for InvalidBatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteOutcome { field, value } => {
                write!(f, "{} must be finite, got {}", field, value)
            }
            Self::NonMonotonicSamples { expected, received } => write!(
                f,
                "sample count went backwards: test holds {} samples, batch starts at {}",
                expected, received
            ),
            Self::SampleHistoryMismatch { expected, received } => write!(
                f,
                "batch starts at {} samples but the test has only seen {}",
                received, expected
            ),
            Self::OutcomeHistoryMismatch { expected, received } => write!(
                f,
                "previous outcome delta {} does not match the cumulative delta {}",
                received, expected
            ),
            Self::OutcomeExceedsSamples {
                outcome_delta,
                samples,
            } => write!(
                f,
                "number of successes cannot be greater than number of samples \
                 (|{}| > {})",
                outcome_delta, samples
            ),
        }
    }
}

impl std::error::Error for InvalidBatchError {}

/// Any error raised by this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// See [`ConfigurationError`].
    Configuration(ConfigurationError),
    /// See [`InvalidBatchError`].
    InvalidBatch(InvalidBatchError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(e) => write!(f, "configuration error: {}", e),
            Error::InvalidBatch(e) => write!(f, "invalid batch: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Configuration(e) => Some(e),
            Error::InvalidBatch(e) => Some(e),
        }
    }
}

impl From<ConfigurationError> for Error {
    fn from(e: ConfigurationError) -> Self {
        Error::Configuration(e)
    }
}

impl From<InvalidBatchError> for Error {
    fn from(e: InvalidBatchError) -> Self {
        Error::InvalidBatch(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_configuration_messages_name_the_constraint() {
        assert_eq!(
            ConfigurationError::InvalidMde(0.0).to_string(),
            "the minimum detectable effect must be positive, got 0"
        );
        assert!(ConfigurationError::InvalidAlpha(1.5)
            .to_string()
            .contains("alpha must be in (0, 1)"));
        assert!(ConfigurationError::EffectExceedsUnity {
            baseline: 0.9,
            treatment: 1.35
        }
        .to_string()
        .starts_with("cannot detect an effect that brings a binary metric over 100%"));
    }

    #[test]
    fn test_umbrella_error_keeps_source() {
        let err: Error = InvalidBatchError::NonMonotonicSamples {
            expected: 10,
            received: 5,
        }
        .into();
        assert!(err.to_string().starts_with("invalid batch:"));
        assert!(err.source().is_some());
    }
}
