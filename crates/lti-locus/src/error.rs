//! Error types for root-locus computation.

use lti_core::LtiError;
use lti_stability::StabilityError;
use thiserror::Error;

pub type LocusResult<T> = Result<T, LocusError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocusError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error(transparent)]
    Core(#[from] LtiError),

    #[error(transparent)]
    Stability(#[from] StabilityError),
}
