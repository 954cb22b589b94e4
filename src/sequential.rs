//! The sequential test: plan once, then evaluate batches.

use tracing::debug;

use crate::config::{Config, TestConfiguration};
use crate::constants::MAX_ZERO_SAMPLE_EVALUATIONS;
use crate::error::{ConfigurationError, InvalidBatchError};
use crate::evaluation::{evaluation_step, Batch, EvaluationReport, EvaluationState};
use crate::planning::{plan, BoundaryPlan};
use crate::rng::{SeededGenerator, Stream};
use crate::types::{Decision, TestStatus};

/// A one-sided group-sequential test between a control and a treatment arm.
///
/// # Example
///
/// ```
/// use basemath::{Config, Decision, SequentialTest};
///
/// let mut test = SequentialTest::new(&Config::binary(0.6, 0.5).seed("exp-42")).unwrap();
/// assert_eq!(test.required_samples(), 34);
///
/// // 10 visitors per arm, 10 more conversions in treatment than in control
/// let decision = test.evaluate(0.0, 10.0, 0, 10).unwrap();
/// assert_eq!(decision, Decision::Continue);
/// ```
#[derive(Debug, Clone)]
pub struct SequentialTest {
    config: TestConfiguration,
    plan: BoundaryPlan,
    state: EvaluationState,
    generator: SeededGenerator,
}

impl SequentialTest {
    /// Validate the configuration and compute the boundary plan.
    pub fn new(config: &Config) -> Result<Self, ConfigurationError> {
        Self::from_validated(config.validate()?)
    }

    /// Build from an already validated configuration.
    pub fn from_validated(config: TestConfiguration) -> Result<Self, ConfigurationError> {
        let plan = plan(&config)?;
        Ok(Self {
            state: EvaluationState::new(config.numeric_seed),
            generator: SeededGenerator::new(config.numeric_seed, Stream::Crossing),
            config,
            plan,
        })
    }

    /// Restore a test from a persisted state.
    ///
    /// The configuration must be the one the state was produced with. The
    /// restored test continues the same random sequence, so it reaches the
    /// same decisions as a test that was never interrupted.
    ///
    /// Restoring replays one draw per recorded call. A state with more calls
    /// than its cumulative samples plus [`MAX_ZERO_SAMPLE_EVALUATIONS`] is
    /// rejected rather than replayed.
    pub fn resume(config: &Config, state: EvaluationState) -> Result<Self, ConfigurationError> {
        let mut test = Self::new(config)?;

        if state.numeric_seed != test.config.numeric_seed {
            return Err(ConfigurationError::StateMismatch {
                message: format!(
                    "state was created with seed hash {:08x}, configuration has {:08x}",
                    state.numeric_seed, test.config.numeric_seed
                ),
            });
        }
        if state.cumulative_samples > test.plan.max_samples_per_arm {
            return Err(ConfigurationError::StateMismatch {
                message: format!(
                    "state holds {} samples per arm, beyond the horizon of {}",
                    state.cumulative_samples, test.plan.max_samples_per_arm
                ),
            });
        }
        if state.concluded != state.decision.is_terminal() {
            return Err(ConfigurationError::StateMismatch {
                message: format!(
                    "concluded is {} but the decision is {}",
                    state.concluded, state.decision
                ),
            });
        }
        if state.draws != state.current_look_index as u64 {
            return Err(ConfigurationError::StateMismatch {
                message: format!(
                    "{} draws recorded for {} evaluations",
                    state.draws, state.current_look_index
                ),
            });
        }
        let plausible_calls = state
            .cumulative_samples
            .saturating_add(MAX_ZERO_SAMPLE_EVALUATIONS);
        if state.draws > plausible_calls {
            return Err(ConfigurationError::StateMismatch {
                message: format!(
                    "{} evaluations recorded for {} samples per arm",
                    state.draws, state.cumulative_samples
                ),
            });
        }
        if !state.cumulative_outcome_delta.is_finite() {
            return Err(ConfigurationError::StateMismatch {
                message: format!(
                    "cumulative outcome delta {} is not finite",
                    state.cumulative_outcome_delta
                ),
            });
        }

        test.generator.fast_forward(state.draws);
        debug!(
            cumulative_samples = state.cumulative_samples,
            evaluations = state.current_look_index,
            concluded = state.concluded,
            "test resumed"
        );
        test.state = state;
        Ok(test)
    }

    /// Per-arm samples at which the test must conclude.
    pub fn required_samples(&self) -> u64 {
        self.plan.max_samples_per_arm
    }

    /// The boundary plan.
    pub fn plan(&self) -> &BoundaryPlan {
        &self.plan
    }

    /// The validated configuration.
    pub fn config(&self) -> &TestConfiguration {
        &self.config
    }

    /// Current evaluation state, for persistence.
    pub fn state(&self) -> &EvaluationState {
        &self.state
    }

    /// Lifecycle status.
    pub fn status(&self) -> TestStatus {
        self.state.status()
    }

    /// Whether a terminal decision has been reached.
    pub fn is_concluded(&self) -> bool {
        self.state.concluded
    }

    /// Per-arm samples still needed to reach the horizon.
    pub fn remaining_samples(&self) -> u64 {
        self.plan
            .max_samples_per_arm
            .saturating_sub(self.state.cumulative_samples)
    }

    /// Evaluate new data and return the decision.
    ///
    /// `previous_outcome_delta` and `previous_sample_count` are the
    /// cumulative totals from before this batch and must match what the
    /// test has seen; the other two arguments describe the batch itself.
    /// Use [`Decision::code`] for the -1/0/1 value.
    pub fn evaluate(
        &mut self,
        previous_outcome_delta: f64,
        outcome_delta_since_last: f64,
        previous_sample_count: u64,
        sample_count_since_last: u64,
    ) -> Result<Decision, InvalidBatchError> {
        let batch = Batch::new(
            previous_outcome_delta,
            outcome_delta_since_last,
            previous_sample_count,
            sample_count_since_last,
        );
        Ok(self.evaluate_batch(batch)?.decision)
    }

    /// Evaluate a batch and return the full report.
    pub fn evaluate_batch(&mut self, batch: Batch) -> Result<EvaluationReport, InvalidBatchError> {
        evaluation_step(
            &self.config,
            &self.plan,
            &mut self.state,
            &mut self.generator,
            &batch,
        )
    }
}
