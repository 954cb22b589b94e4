//! One evaluation step: validate a batch, move the path, decide.
//!
//! # Usage Pattern
//!
//! ```ignore
//! let mut state = EvaluationState::new(config.numeric_seed);
//! let mut generator = SeededGenerator::new(config.numeric_seed, Stream::Crossing);
//!
//! for batch in batches {
//!     let report = evaluation_step(&config, &plan, &mut state, &mut generator, &batch)?;
//!     if report.decision.is_terminal() {
//!         break;
//!     }
//! }
//! ```

use core::cmp::Ordering;

use tracing::{info, trace, warn};

use crate::config::TestConfiguration;
use crate::constants::HISTORY_RELATIVE_TOLERANCE;
use crate::error::InvalidBatchError;
use crate::planning::BoundaryPlan;
use crate::rng::SeededGenerator;
use crate::types::Decision;

use super::{bridge_crossing_probability, EvaluationState};

/// Data for one evaluation call.
///
/// The caller passes its view of the history (`previous_*`) together with
/// the change since the last call; both are checked against the stored
/// totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch {
    /// Cumulative treatment-minus-control outcome before this batch.
    pub previous_outcome_delta: f64,

    /// Treatment-minus-control outcome change in this batch.
    ///
    /// For binary metrics, successes in treatment minus successes in control.
    pub outcome_delta_since_last: f64,

    /// Cumulative per-arm samples before this batch.
    pub previous_sample_count: u64,

    /// Per-arm samples added by this batch.
    pub sample_count_since_last: u64,
}

impl Batch {
    /// Create a batch from the four evaluation arguments.
    pub fn new(
        previous_outcome_delta: f64,
        outcome_delta_since_last: f64,
        previous_sample_count: u64,
        sample_count_since_last: u64,
    ) -> Self {
        Self {
            previous_outcome_delta,
            outcome_delta_since_last,
            previous_sample_count,
            sample_count_since_last,
        }
    }

    /// First batch of a test: no history yet.
    pub fn first(outcome_delta: f64, sample_count: u64) -> Self {
        Self::new(0.0, outcome_delta, 0, sample_count)
    }
}

/// Everything one evaluation call computed.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// The decision.
    pub decision: Decision,

    /// Planned look the cumulative sample count falls under.
    ///
    /// Every accepted call gets exactly one label: the first planned look
    /// whose planned samples reach the new cumulative count. Labels never
    /// decrease. Several small batches inside one planned interval share a
    /// label, and a batch spanning several intervals takes the last one.
    /// Boundaries are evaluated at the exact information fraction, so the
    /// label never changes a decision.
    pub look_index: usize,

    /// Cumulative samples divided by the horizon.
    pub information_fraction: f64,

    /// Per-arm samples after this call.
    pub cumulative_samples: u64,

    /// Outcome delta after this call.
    pub cumulative_outcome_delta: f64,

    /// Standardized statistic, `None` before any samples.
    pub statistic: Option<f64>,

    /// Efficacy boundary at this information fraction.
    pub efficacy_boundary: f64,

    /// Futility boundary at this information fraction.
    pub futility_boundary: f64,

    /// Probability that the path touched the futility line during this
    /// batch. `None` when the test had already concluded.
    pub crossing_probability: Option<f64>,

    /// Samples dropped because the batch overshot the horizon.
    pub truncated_samples: u64,

    /// Whether the horizon has been reached.
    pub is_final: bool,
}

impl EvaluationReport {
    /// Report for a call made after the test concluded.
    fn frozen(plan: &BoundaryPlan, state: &EvaluationState) -> Self {
        let look_index = state
            .last_look
            .unwrap_or_else(|| plan.final_look().look_index);
        let t = plan.information_fraction(state.cumulative_samples);
        Self {
            decision: state.decision,
            look_index,
            information_fraction: t,
            cumulative_samples: state.cumulative_samples,
            cumulative_outcome_delta: state.cumulative_outcome_delta,
            statistic: plan.statistic(state.cumulative_outcome_delta, state.cumulative_samples),
            efficacy_boundary: plan.efficacy_boundary_at(t),
            futility_boundary: plan.futility_boundary_at(t),
            crossing_probability: None,
            truncated_samples: 0,
            is_final: state.cumulative_samples >= plan.max_samples_per_arm,
        }
    }
}

/// Check a batch against the stored history without changing anything.
pub fn validate_batch(
    config: &TestConfiguration,
    state: &EvaluationState,
    batch: &Batch,
) -> Result<(), InvalidBatchError> {
    for (field, value) in [
        ("previous_outcome_delta", batch.previous_outcome_delta),
        ("outcome_delta_since_last", batch.outcome_delta_since_last),
    ] {
        if !value.is_finite() {
            return Err(InvalidBatchError::NonFiniteOutcome { field, value });
        }
    }

    let expected = state.cumulative_samples;
    let received = batch.previous_sample_count;
    match received.cmp(&expected) {
        Ordering::Less => {
            return Err(InvalidBatchError::NonMonotonicSamples { expected, received })
        }
        Ordering::Greater => {
            return Err(InvalidBatchError::SampleHistoryMismatch { expected, received })
        }
        Ordering::Equal => {}
    }

    let expected = state.cumulative_outcome_delta;
    let received = batch.previous_outcome_delta;
    let scale = expected.abs().max(received.abs()).max(1.0);
    if (received - expected).abs() > HISTORY_RELATIVE_TOLERANCE * scale {
        return Err(InvalidBatchError::OutcomeHistoryMismatch { expected, received });
    }

    if config.metric.is_binary()
        && batch.outcome_delta_since_last.abs() > batch.sample_count_since_last as f64
    {
        return Err(InvalidBatchError::OutcomeExceedsSamples {
            outcome_delta: batch.outcome_delta_since_last,
            samples: batch.sample_count_since_last,
        });
    }

    Ok(())
}

/// Evaluate one batch, updating `state` and consuming one draw from
/// `generator` when the batch is accepted.
///
/// A rejected batch leaves both untouched. After the test has concluded the
/// batch is ignored and the frozen decision is reported.
pub fn evaluation_step(
    config: &TestConfiguration,
    plan: &BoundaryPlan,
    state: &mut EvaluationState,
    generator: &mut SeededGenerator,
    batch: &Batch,
) -> Result<EvaluationReport, InvalidBatchError> {
    if state.concluded {
        trace!(decision = state.decision.code(), "test already concluded");
        return Ok(EvaluationReport::frozen(plan, state));
    }

    if let Err(err) = validate_batch(config, state, batch) {
        warn!(
            error = %err,
            cumulative_samples = state.cumulative_samples,
            "batch rejected"
        );
        return Err(err);
    }

    let horizon = plan.max_samples_per_arm;
    let previous_samples = state.cumulative_samples;
    let previous_delta = state.cumulative_outcome_delta;

    // Keep only the samples up to the horizon, with a proportional share of
    // the outcome change
    let room = horizon.saturating_sub(previous_samples);
    let (kept_samples, kept_change) = if batch.sample_count_since_last > room {
        let share = room as f64 / batch.sample_count_since_last as f64;
        (room, batch.outcome_delta_since_last * share)
    } else {
        (batch.sample_count_since_last, batch.outcome_delta_since_last)
    };
    let truncated_samples = batch.sample_count_since_last - kept_samples;

    let samples = previous_samples + kept_samples;
    let outcome_delta = previous_delta + kept_change;
    let is_final = samples >= horizon;

    let height_before = previous_delta - plan.futility_threshold(previous_samples as f64);
    let height_after = outcome_delta - plan.futility_threshold(samples as f64);
    let crossing_probability = bridge_crossing_probability(
        height_before,
        height_after,
        kept_samples as f64,
        plan.variance_crossing,
    );

    let draw = generator.next_uniform();
    let decision = if draw < crossing_probability {
        Decision::Futility
    } else if is_final {
        Decision::Superiority
    } else {
        Decision::Continue
    };

    let look_index = plan.look_for_samples(samples).look_index;
    let information_fraction = plan.information_fraction(samples);
    let (efficacy_boundary, futility_boundary) = if is_final {
        (plan.terminal_critical_value, plan.terminal_critical_value)
    } else {
        (
            plan.efficacy_boundary_at(information_fraction),
            plan.futility_boundary_at(information_fraction),
        )
    };
    let statistic = plan.statistic(outcome_delta, samples);

    state.advance(
        outcome_delta,
        samples,
        look_index,
        decision,
        generator.draws(),
    );

    trace!(
        look_index,
        cumulative_samples = samples,
        information_fraction,
        statistic = statistic.unwrap_or(f64::NAN),
        futility_boundary,
        crossing_probability,
        decision = decision.code(),
        "batch evaluated"
    );
    if decision.is_terminal() {
        info!(
            decision = decision.code(),
            cumulative_samples = samples,
            evaluations = state.current_look_index,
            truncated_samples,
            "test concluded"
        );
    }

    Ok(EvaluationReport {
        decision,
        look_index,
        information_fraction,
        cumulative_samples: samples,
        cumulative_outcome_delta: outcome_delta,
        statistic,
        efficacy_boundary,
        futility_boundary,
        crossing_probability: Some(crossing_probability),
        truncated_samples,
        is_final,
    })
}
