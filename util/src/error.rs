//! Error types for plan construction.

use thiserror::Error;

/// Everything that can go wrong while building a plan.
///
/// Errors are only ever produced before any work begins; executing a plan that
/// was built successfully never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A size, order, degree or spin argument lies outside its domain.
    #[error("invalid {what} = {value}: {reason}")]
    InvalidSize {
        /// Name of the offending argument.
        what: &'static str,
        /// The value that was supplied.
        value: i64,
        /// Human readable constraint that was violated.
        reason: &'static str,
    },

    /// Shape parameters make the connection recurrence ill-defined.
    #[error("singular connection problem: {reason}")]
    SingularConnection {
        /// Description of the degenerate parameter combination.
        reason: String,
    },

    /// Working memory for the plan could not be obtained.
    #[error("failed to allocate {len} elements of plan storage")]
    AllocationFailure {
        /// Number of elements requested.
        len: usize,
    },
}

impl PlanError {
    /// Shorthand for an [`PlanError::InvalidSize`] built from any integer-like value.
    pub fn invalid_size(what: &'static str, value: impl TryInto<i64>, reason: &'static str) -> Self {
        Self::InvalidSize {
            what,
            value: value.try_into().unwrap_or(i64::MAX),
            reason,
        }
    }

    pub fn singular(reason: impl Into<String>) -> Self {
        Self::SingularConnection {
            reason: reason.into(),
        }
    }
}

/// Result type alias for plan construction.
pub type PlanResult<T> = Result<T, PlanError>;
