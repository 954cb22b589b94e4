//! Default configuration values and numerical limits.

/// Default seed string used when the caller does not supply one.
///
/// Experiments should always pass a seed tied to the experiment (its name or
/// key) so repeated evaluations of the same data reach the same decision.
pub const DEFAULT_SEED: &str = "basemath";

/// Default Type I error budget.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default Type II error budget (80% power).
pub const DEFAULT_BETA: f64 = 0.2;

/// Default number of planned interim looks, including the final one.
pub const DEFAULT_PLANNED_LOOKS: usize = 10;

/// Default jitter applied to interior look positions, as a fraction of the
/// spacing between two looks.
pub const DEFAULT_SCHEDULE_JITTER: f64 = 0.5;

// =============================================================================
// Sample size search
// =============================================================================

/// Largest per-arm sample size the planner will consider.
///
/// Configurations that would need more samples than this are rejected with
/// `ConfigurationError::SampleSizeUnbounded`.
pub const MAX_REQUIRED_SAMPLES: f64 = 1.0e12;

/// Iteration cap for the bisection on the sample size.
pub const MAX_BISECTION_ITERATIONS: usize = 200;

/// Relative width at which the bisection stops.
pub const BISECTION_RELATIVE_TOLERANCE: f64 = 1.0e-12;

/// Relative tolerance when matching the caller's previous outcome delta
/// against the stored cumulative value.
pub const HISTORY_RELATIVE_TOLERANCE: f64 = 1.0e-9;

// =============================================================================
// Persisted state
// =============================================================================

/// Accepted calls a restored state may hold beyond one per sample.
///
/// Every call with samples adds at least one to the cumulative count, so
/// only zero-sample calls can push the call count past it. Restoring a state
/// replays one draw per call, and states past this allowance are rejected.
pub const MAX_ZERO_SAMPLE_EVALUATIONS: u64 = 1_000_000;

/// Natural log of 2*pi.
pub const LOG_2PI: f64 = 1.8378770664093453;
