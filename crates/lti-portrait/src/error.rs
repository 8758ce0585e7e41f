use lti_core::LtiError;
use lti_sim::SimError;
use thiserror::Error;

pub type PortraitResult<T> = Result<T, PortraitError>;

#[derive(Error, Debug)]
pub enum PortraitError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error(transparent)]
    Core(#[from] LtiError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),
}

impl PortraitError {
    pub fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidInput { what: what.into() }
    }
}
