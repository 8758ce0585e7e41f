//! Time-domain analysis of LTI transfer functions.
//!
//! - `forward`: pole-based stability verdict and unit-step metrics
//! - `inverse`: second-order damping ratio / natural frequency from metrics
//! - `metrics`: extraction of rise, peak and settling figures from a sampled response

pub mod error;
pub mod forward;
pub mod inverse;
pub mod metrics;

pub use error::{TimeError, TimeResult};
pub use forward::{StabilityReport, StabilityStatus, TimeAnalysis, analyze, classify_poles};
pub use inverse::{InverseOptions, InverseRequest, InverseResult, inverse_analyze};
pub use metrics::{StepMetrics, extract_metrics};
