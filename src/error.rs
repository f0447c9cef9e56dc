//! Error types for bucket elimination.

use thiserror::Error;

/// Main error type for bucket computations.
///
/// [`BucketError::Infeasible`] is the only recoverable condition: it tells
/// the caller that the subproblem has no solution. Every other variant
/// points at a malformed problem definition or a misuse of the API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BucketError {
    /// Every candidate row violated a hard constraint or inherited infeasibility.
    #[error("infeasible: all {candidates} candidate rows violate the hard constraints")]
    Infeasible {
        /// Number of rows enumerated before filtering.
        candidates: usize,
    },

    /// A referenced variable has no domain entry.
    #[error("missing domain for variable `{variable}`")]
    MissingDomain { variable: String },

    /// A soft constraint lists a different number of arguments than its function takes.
    #[error("soft constraint {constraint}: function takes {expected} arguments, {actual} listed")]
    ArityMismatch {
        constraint: usize,
        expected: usize,
        actual: usize,
    },

    /// A soft constraint function returned NaN.
    #[error("soft constraint {constraint} is undefined on the given values")]
    UndefinedCost { constraint: usize },

    /// A hard constraint is malformed.
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),

    /// An inherited h-function mentions a variable outside the table scope.
    #[error("h-function variable `{variable}` is not part of the table scope")]
    ScopeMismatch { variable: String },

    /// The joint table would exceed the row limit (or `usize`).
    #[error("table exceeds the row limit of {limit}")]
    TableTooLarge { limit: usize },

    /// The bucket has already been computed.
    #[error("bucket `{variable}` has already been computed")]
    AlreadyComputed { variable: String },

    /// The elimination order is malformed.
    #[error("invalid elimination order: {0}")]
    InvalidOrder(String),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BucketError {
    /// Whether this is the recoverable "no solution" condition.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, BucketError::Infeasible { .. })
    }

    /// Whether this error indicates a malformed problem definition.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BucketError::MissingDomain { .. }
                | BucketError::ArityMismatch { .. }
                | BucketError::UndefinedCost { .. }
                | BucketError::InvalidConstraint(_)
                | BucketError::ScopeMismatch { .. }
                | BucketError::InvalidOrder(_)
                | BucketError::InvalidConfig(_)
        )
    }
}

/// Result type alias for bucket operations.
pub type Result<T> = std::result::Result<T, BucketError>;
