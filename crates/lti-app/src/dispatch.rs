//! Endpoint routing over JSON bodies.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{AppError, AppResult};
use crate::service;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    AnalyzeTf,
    InverseAnalyzeTf,
    AnalyzeStabilityRange,
    PlotRootLocus,
    AnalyzeFrequencyDomain,
    DesignLead,
    DesignLag,
    DesignLagLead,
    PlotPhasePortrait,
}

impl Endpoint {
    pub const ALL: [Endpoint; 9] = [
        Endpoint::AnalyzeTf,
        Endpoint::InverseAnalyzeTf,
        Endpoint::AnalyzeStabilityRange,
        Endpoint::PlotRootLocus,
        Endpoint::AnalyzeFrequencyDomain,
        Endpoint::DesignLead,
        Endpoint::DesignLag,
        Endpoint::DesignLagLead,
        Endpoint::PlotPhasePortrait,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::AnalyzeTf => "analyze_tf",
            Endpoint::InverseAnalyzeTf => "inverse_analyze_tf",
            Endpoint::AnalyzeStabilityRange => "analyze_stability_range",
            Endpoint::PlotRootLocus => "plot_root_locus",
            Endpoint::AnalyzeFrequencyDomain => "analyze_frequency_domain",
            Endpoint::DesignLead => "compensation/design_lead_compensator",
            Endpoint::DesignLag => "compensation/design_lag_compensator",
            Endpoint::DesignLagLead => "compensation/design_lag_lead_compensator",
            Endpoint::PlotPhasePortrait => "analysis/plot_phase_portrait",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Endpoint {
    type Err = AppError;

    /// Accepts the path with or without a leading `/`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().trim_start_matches('/');
        Endpoint::ALL
            .into_iter()
            .find(|e| e.path() == path)
            .ok_or_else(|| AppError::UnknownEndpoint(s.to_string()))
    }
}

fn parse<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    serde_json::from_value(body)
        .map_err(|e| AppError::InvalidInput(format!("malformed request body: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> AppResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Route a JSON request body to its endpoint and return the JSON response.
pub fn dispatch(endpoint: &str, body: Value, cfg: &EngineConfig) -> AppResult<Value> {
    let endpoint: Endpoint = endpoint.parse()?;
    debug!(%endpoint, "dispatching request");
    match endpoint {
        Endpoint::AnalyzeTf => to_json(&service::analyze_tf(&parse(body)?, cfg)?),
        Endpoint::InverseAnalyzeTf => to_json(&service::inverse_analyze_tf(&parse(body)?, cfg)),
        Endpoint::AnalyzeStabilityRange => {
            to_json(&service::analyze_stability_range(&parse(body)?, cfg)?)
        }
        Endpoint::PlotRootLocus => to_json(&service::plot_root_locus(&parse(body)?, cfg)?),
        Endpoint::AnalyzeFrequencyDomain => {
            to_json(&service::analyze_frequency_domain(&parse(body)?, cfg)?)
        }
        Endpoint::DesignLead => to_json(&service::design_lead_compensator(&parse(body)?, cfg)?),
        Endpoint::DesignLag => to_json(&service::design_lag_compensator(&parse(body)?, cfg)?),
        Endpoint::DesignLagLead => {
            to_json(&service::design_lag_lead_compensator(&parse(body)?, cfg)?)
        }
        Endpoint::PlotPhasePortrait => to_json(&service::plot_phase_portrait(&parse(body)?, cfg)?),
    }
}
