//! # basemath
//!
//! One-sided group-sequential A/B testing with closed-form boundaries.
//!
//! A test compares a treatment arm against a control arm with a 50/50 split
//! and decides whether the treatment beats the control by at least a
//! minimum detectable effect (MDE). Data arrives in batches; after each
//! batch the test returns:
//!
//! - `-1` ([`Decision::Futility`]): stop, the treatment does not reach the MDE
//! - `0` ([`Decision::Continue`]): keep collecting data
//! - `1` ([`Decision::Superiority`]): stop, the treatment is better
//!
//! The Type I error (α) and Type II error (β) hold however the data is
//! batched. The maximum sample size is known up front.
//!
//! ## Quick Start
//!
//! ```
//! use basemath::{Config, Decision, SequentialTest};
//!
//! // 10% baseline conversion rate, detect a 5% relative uplift
//! let config = Config::binary(0.10, 0.05).seed("checkout-redesign");
//! let mut test = SequentialTest::new(&config).unwrap();
//! println!("needs {} visitors per arm", test.required_samples());
//!
//! // First day: 1000 visitors per arm, 4 more conversions in treatment
//! let decision = test.evaluate(0.0, 4.0, 0, 1000).unwrap();
//! assert_eq!(decision, Decision::Continue);
//!
//! // Second day: pass the totals seen so far, then the new data
//! let decision = test.evaluate(4.0, 7.0, 1000, 1000).unwrap();
//! assert_eq!(decision.code(), 0);
//! ```
//!
//! ## Persisting a test
//!
//! [`EvaluationState`] is serializable. Store it after each batch and
//! restore with [`SequentialTest::resume`]; the restored test reaches the
//! same decisions as one that was never interrupted.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod formatting;
mod sequential;
mod types;

// Functional modules
pub mod constants;
pub mod evaluation;
pub mod math;
pub mod planning;
pub mod rng;

// Re-exports for public API
pub use config::{Config, TestConfiguration};
pub use error::{ConfigurationError, Error, InvalidBatchError};
pub use evaluation::{Batch, EvaluationReport, EvaluationState};
pub use planning::{BoundaryPlan, Look};
pub use rng::{hash_seed, SeededGenerator, Stream};
pub use sequential::SequentialTest;
pub use types::{Decision, MetricKind, TestStatus};
