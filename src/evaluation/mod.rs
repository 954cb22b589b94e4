//! Incremental evaluation of batches against a boundary plan.
//!
//! Each accepted batch moves the outcome path from its previous point to a
//! new one:
//!
//! 1. **Validation**: the caller's view of the history must match the stored
//!    cumulative totals, and the batch must be well formed.
//! 2. **Truncation**: samples beyond the horizon are dropped, the outcome
//!    change is scaled by the share that was kept.
//! 3. **Crossing**: the probability that the path touched the futility line
//!    between the two points is 1 if the new point is on or below the line,
//!    the Brownian-bridge value otherwise. One seeded draw decides it.
//! 4. **Decision**: a crossing stops for futility; surviving to the horizon
//!    is superiority; anything else continues.
//!
//! ## Key Design Decisions
//!
//! - **Crossing variance**: the bridge uses the larger of the null and
//!   alternative variance rates. Under H0 it never understates a crossing,
//!   so the Type I rate stays within α for batches of any size. When the
//!   alternative rate is the smaller one, the bridge overstates crossings
//!   under H1 and the Type II rate falls with finer batches; the futility
//!   line is placed so that even a single batch up to the horizon keeps it
//!   within β.
//!
//! - **Frozen conclusions**: once a test concludes, later calls return the
//!   same decision without validating or consuming draws.

mod crossing;
mod state;
mod step;

pub use crossing::bridge_crossing_probability;
pub use state::EvaluationState;
pub use step::{evaluation_step, validate_batch, Batch, EvaluationReport};
