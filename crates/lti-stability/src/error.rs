//! Error types for the stability analyzer.

use lti_core::LtiError;
use thiserror::Error;

pub type StabilityResult<T> = Result<T, StabilityError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StabilityError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Unsupported symbolic expression: {what}")]
    UnsupportedSymbolicExpression { what: String },

    #[error(transparent)]
    Core(#[from] LtiError),
}

impl StabilityError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        StabilityError::InvalidInput { what: what.into() }
    }

    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        StabilityError::UnsupportedSymbolicExpression { what: what.into() }
    }
}
