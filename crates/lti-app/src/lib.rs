//! Request/response layer over the LTI analysis engines.
//!
//! This crate gives every front end (CLI, tests, an eventual HTTP shim) one
//! entry point per endpoint, typed request bodies, a YAML-loadable engine
//! configuration and a single error taxonomy with serializable error bodies.

pub mod config;
pub mod contracts;
pub mod dispatch;
pub mod error;
pub mod service;

// Re-export key types for convenience
pub use config::{EngineConfig, load_config};
pub use contracts::{
    Coefficient, DesignRequest, FrequencyRequest, RootLocusRequest, StabilityRangeRequest,
    TfRequest,
};
pub use dispatch::{Endpoint, dispatch};
pub use error::{AppError, AppResult, ErrorBody};
pub use service::{
    analyze_frequency_domain, analyze_stability_range, analyze_tf, design_lag_compensator,
    design_lag_lead_compensator, design_lead_compensator, inverse_analyze_tf, plot_phase_portrait,
    plot_root_locus,
};
