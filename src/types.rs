//! Common types: metric kinds, decisions and test status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Kind of success metric being compared between the two arms.
///
/// The variance model follows from the kind: binary metrics derive their
/// variance from the mean, continuous metrics need an explicit estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MetricKind {
    /// Conversion-style metric with values in {0, 1}.
    ///
    /// The baseline estimate is a rate in (0, 1) and the variance is the
    /// Bernoulli variance p(1-p).
    Binary,

    /// Real-valued metric such as revenue per visitor.
    ///
    /// Visitors who do not convert count as zero, so the variance must be
    /// estimated over all visitors, not only the converting ones.
    Continuous {
        /// Variance of the metric in the control arm.
        variance: f64,
    },
}

impl MetricKind {
    /// Whether this is a binary metric.
    pub fn is_binary(&self) -> bool {
        matches!(self, MetricKind::Binary)
    }

    /// Short name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Binary => "binary",
            MetricKind::Continuous { .. } => "continuous",
        }
    }
}

/// Decision returned by one evaluation step.
///
/// The integer codes returned by [`Decision::code`] are the -1/0/1 values
/// callers persist and compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Decision {
    /// The alternative is rejected: the treatment does not reach the MDE.
    Futility,

    /// No conclusion yet, keep collecting data.
    #[default]
    Continue,

    /// The null is rejected: the treatment beats the control by the MDE.
    Superiority,
}

impl Decision {
    /// Integer code: -1 for futility, 0 to continue, 1 for superiority.
    pub fn code(&self) -> i8 {
        match self {
            Decision::Futility => -1,
            Decision::Continue => 0,
            Decision::Superiority => 1,
        }
    }

    /// Inverse of [`Decision::code`].
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Decision::Futility),
            0 => Some(Decision::Continue),
            1 => Some(Decision::Superiority),
            _ => None,
        }
    }

    /// Whether this decision ends the test.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Continue)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Futility => write!(f, "futility (-1)"),
            Decision::Continue => write!(f, "continue (0)"),
            Decision::Superiority => write!(f, "superiority (1)"),
        }
    }
}

/// Lifecycle of a sequential test.
///
/// `Running` moves to either concluded state; both concluded states are
/// absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestStatus {
    /// Still accepting batches.
    Running,
    /// Stopped for futility, at any look.
    ConcludedFutility,
    /// Stopped for superiority, only ever at the final look.
    ConcludedSuperiority,
}

impl From<Decision> for TestStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Futility => TestStatus::ConcludedFutility,
            Decision::Continue => TestStatus::Running,
            Decision::Superiority => TestStatus::ConcludedSuperiority,
        }
    }
}
