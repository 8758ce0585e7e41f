use thiserror::Error;

pub type LtiResult<T> = Result<T, LtiError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LtiError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Invalid system: {what}")]
    InvalidSystem { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

impl LtiError {
    pub fn invalid_input(what: impl Into<String>) -> Self {
        LtiError::InvalidInput { what: what.into() }
    }
}
