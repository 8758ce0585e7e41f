use lti_core::LtiError;
use lti_freq::FreqError;
use lti_sim::SimError;
use thiserror::Error;

pub type DesignResult<T> = Result<T, DesignError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    /// The plant already satisfies the requested target.
    #[error("Target already met: {what}")]
    TargetAlreadyMet { what: String },

    #[error("Unreachable design target: {what}")]
    UnreachableDesignTarget { what: String },

    #[error(transparent)]
    Core(#[from] LtiError),

    #[error(transparent)]
    Frequency(#[from] FreqError),

    #[error("Simulation error: {message}")]
    Simulation { message: String },
}

impl From<SimError> for DesignError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Improper { what } => DesignError::InvalidInput {
                what: what.to_string(),
            },
            other => DesignError::Simulation {
                message: other.to_string(),
            },
        }
    }
}

pub(crate) fn unreachable(what: impl Into<String>) -> DesignError {
    DesignError::UnreachableDesignTarget { what: what.into() }
}

pub(crate) fn invalid(what: impl Into<String>) -> DesignError {
    DesignError::InvalidInput { what: what.into() }
}
