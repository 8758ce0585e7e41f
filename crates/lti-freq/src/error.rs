use lti_core::LtiError;
use thiserror::Error;

pub type FreqResult<T> = Result<T, FreqError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FreqError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error(transparent)]
    Core(#[from] LtiError),
}

pub(crate) fn invalid(what: impl Into<String>) -> FreqError {
    FreqError::InvalidInput { what: what.into() }
}
