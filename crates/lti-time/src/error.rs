//! Error types for time-domain analysis.

use lti_core::LtiError;
use lti_sim::SimError;
use thiserror::Error;

pub type TimeResult<T> = Result<T, TimeError>;

#[derive(Error, Debug)]
pub enum TimeError {
    #[error(transparent)]
    Core(#[from] LtiError),

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Simulation error: {message}")]
    Simulation { message: String },
}

impl From<SimError> for TimeError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Improper { what } => TimeError::InvalidInput {
                what: what.to_string(),
            },
            other => TimeError::Simulation {
                message: other.to_string(),
            },
        }
    }
}
