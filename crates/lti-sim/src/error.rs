//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered during simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Improper system: {what}")]
    Improper { what: &'static str },

    #[error("Response diverged at t = {t}")]
    Diverged { t: f64 },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<lti_core::LtiError> for SimError {
    fn from(e: lti_core::LtiError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
