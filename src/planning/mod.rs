//! Horizon and boundary planning, done once when a test is created.

mod boundary;
mod sample_size;

pub use boundary::{plan, BoundaryPlan, Look};
pub use sample_size::{
    fixed_horizon_samples, futility_intercept, futility_quantile, null_survival_probability,
    required_samples, single_look_futility_probability, SampleSize,
};
