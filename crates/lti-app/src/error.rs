//! Error types for the lti-app service layer.

use std::path::PathBuf;

use lti_core::LtiError;
use lti_design::DesignError;
use lti_freq::FreqError;
use lti_locus::LocusError;
use lti_portrait::PortraitError;
use lti_sim::SimError;
use lti_stability::StabilityError;
use lti_time::TimeError;
use serde::{Deserialize, Serialize};

/// Application error that folds every engine error into one taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid system: {0}")]
    InvalidSystem(String),

    #[error("Unsupported symbolic expression: {0}")]
    UnsupportedSymbolicExpression(String),

    #[error("Unreachable design target: {0}")]
    UnreachableDesignTarget(String),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Numerical failure: {0}")]
    Numerical(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for lti-app operations.
pub type AppResult<T> = Result<T, AppError>;

/// Serializable error payload, `{ "error": kind, "detail": message }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl AppError {
    /// Stable taxonomy name.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::InvalidSystem(_) => "InvalidSystem",
            AppError::UnsupportedSymbolicExpression(_) => "UnsupportedSymbolicExpression",
            AppError::UnreachableDesignTarget(_) => "UnreachableDesignTarget",
            AppError::UnknownEndpoint(_) => "UnknownEndpoint",
            AppError::Config(_) | AppError::ConfigFileRead { .. } => "ConfigError",
            AppError::Numerical(_) => "NumericalFailure",
            AppError::Simulation(_) => "SimulationError",
            AppError::Serialization(_) => "SerializationError",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let detail = match self {
            AppError::ConfigFileRead { path, source } => {
                format!("{}: {source}", path.display())
            }
            AppError::InvalidInput(m)
            | AppError::InvalidSystem(m)
            | AppError::UnsupportedSymbolicExpression(m)
            | AppError::UnreachableDesignTarget(m)
            | AppError::UnknownEndpoint(m)
            | AppError::Config(m)
            | AppError::Numerical(m)
            | AppError::Simulation(m)
            | AppError::Serialization(m) => m.clone(),
        };
        ErrorBody {
            error: self.kind().to_string(),
            detail,
        }
    }
}

// Conversions from engine error types
impl From<LtiError> for AppError {
    fn from(err: LtiError) -> Self {
        match err {
            LtiError::InvalidInput { .. } | LtiError::NonFinite { .. } => {
                AppError::InvalidInput(err.to_string())
            }
            LtiError::InvalidSystem { what } => AppError::InvalidSystem(what.to_string()),
            LtiError::Invariant { .. } => AppError::Numerical(err.to_string()),
        }
    }
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::Improper { what } => AppError::InvalidInput(what.to_string()),
            other => AppError::Simulation(other.to_string()),
        }
    }
}

impl From<TimeError> for AppError {
    fn from(err: TimeError) -> Self {
        match err {
            TimeError::Core(e) => e.into(),
            TimeError::InvalidInput { what } => AppError::InvalidInput(what),
            TimeError::Simulation { message } => AppError::Simulation(message),
        }
    }
}

impl From<StabilityError> for AppError {
    fn from(err: StabilityError) -> Self {
        match err {
            StabilityError::InvalidInput { what } => AppError::InvalidInput(what),
            StabilityError::UnsupportedSymbolicExpression { what } => {
                AppError::UnsupportedSymbolicExpression(what)
            }
            StabilityError::Core(e) => e.into(),
        }
    }
}

impl From<LocusError> for AppError {
    fn from(err: LocusError) -> Self {
        match err {
            LocusError::InvalidInput { what } => AppError::InvalidInput(what),
            LocusError::Core(e) => e.into(),
            LocusError::Stability(e) => e.into(),
        }
    }
}

impl From<FreqError> for AppError {
    fn from(err: FreqError) -> Self {
        match err {
            FreqError::InvalidInput { what } => AppError::InvalidInput(what),
            FreqError::Core(e) => e.into(),
        }
    }
}

impl From<DesignError> for AppError {
    fn from(err: DesignError) -> Self {
        match err {
            DesignError::InvalidInput { what } => AppError::InvalidInput(what),
            // the target needs no compensation; the request itself is at fault
            DesignError::TargetAlreadyMet { what } => AppError::InvalidInput(what),
            DesignError::UnreachableDesignTarget { what } => AppError::UnreachableDesignTarget(what),
            DesignError::Core(e) => e.into(),
            DesignError::Frequency(e) => e.into(),
            DesignError::Simulation { message } => AppError::Simulation(message),
        }
    }
}

impl From<PortraitError> for AppError {
    fn from(err: PortraitError) -> Self {
        match err {
            PortraitError::InvalidInput { what } => AppError::InvalidInput(what),
            PortraitError::Core(e) => e.into(),
            PortraitError::Simulation(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_names() {
        let e: AppError = LtiError::InvalidSystem {
            what: "denominator is identically zero",
        }
        .into();
        assert_eq!(e.kind(), "InvalidSystem");

        let e: AppError = DesignError::TargetAlreadyMet {
            what: "met".into(),
        }
        .into();
        assert_eq!(e.kind(), "InvalidInput");

        let e: AppError = StabilityError::UnsupportedSymbolicExpression { what: "x, y".into() }.into();
        assert_eq!(e.kind(), "UnsupportedSymbolicExpression");
    }

    #[test]
    fn body_carries_detail() {
        let body = AppError::UnreachableDesignTarget("needs 80 deg of lead".into()).to_body();
        assert_eq!(body.error, "UnreachableDesignTarget");
        assert_eq!(body.detail, "needs 80 deg of lead");
    }
}
