//! Mutable state carried from one evaluation call to the next.

use serde::{Deserialize, Serialize};

use crate::types::{Decision, TestStatus};

/// Cumulative totals and lifecycle of one test.
///
/// Serializable so callers can persist it between batches and restore the
/// test with [`SequentialTest::resume`](crate::SequentialTest::resume).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationState {
    /// Treatment-minus-control outcome sum over all accepted samples.
    pub cumulative_outcome_delta: f64,

    /// Per-arm samples accepted so far (never beyond the horizon).
    pub cumulative_samples: u64,

    /// Number of accepted evaluation calls.
    pub current_look_index: usize,

    /// Planned look matched by the most recent accepted call.
    pub last_look: Option<usize>,

    /// Whether a terminal decision has been reached.
    pub concluded: bool,

    /// Latest decision; terminal once `concluded` is set.
    pub decision: Decision,

    /// Numeric seed of the generator that produced the draws.
    pub numeric_seed: u64,

    /// Values drawn from the crossing stream so far.
    pub draws: u64,
}

impl EvaluationState {
    /// Fresh state for a test that has seen no data.
    pub fn new(numeric_seed: u64) -> Self {
        Self {
            cumulative_outcome_delta: 0.0,
            cumulative_samples: 0,
            current_look_index: 0,
            last_look: None,
            concluded: false,
            decision: Decision::Continue,
            numeric_seed,
            draws: 0,
        }
    }

    /// Lifecycle status.
    pub fn status(&self) -> TestStatus {
        if self.concluded {
            TestStatus::from(self.decision)
        } else {
            TestStatus::Running
        }
    }

    /// Record an accepted call.
    pub(crate) fn advance(
        &mut self,
        outcome_delta: f64,
        samples: u64,
        look_index: usize,
        decision: Decision,
        draws: u64,
    ) {
        self.cumulative_outcome_delta = outcome_delta;
        self.cumulative_samples = samples;
        self.current_look_index += 1;
        self.last_look = Some(look_index);
        self.decision = decision;
        self.concluded = decision.is_terminal();
        self.draws = draws;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_running() {
        let state = EvaluationState::new(42);
        assert_eq!(state.status(), TestStatus::Running);
        assert_eq!(state.cumulative_samples, 0);
        assert_eq!(state.last_look, None);
        assert_eq!(state.numeric_seed, 42);
    }

    #[test]
    fn test_advance_concludes_on_terminal_decision() {
        let mut state = EvaluationState::new(1);
        state.advance(3.0, 100, 1, Decision::Continue, 1);
        assert!(!state.concluded);
        assert_eq!(state.current_look_index, 1);

        state.advance(-2.0, 250, 3, Decision::Futility, 2);
        assert!(state.concluded);
        assert_eq!(state.status(), TestStatus::ConcludedFutility);
        assert_eq!(state.last_look, Some(3));
        assert_eq!(state.current_look_index, 2);
        assert_eq!(state.draws, 2);
    }
}
