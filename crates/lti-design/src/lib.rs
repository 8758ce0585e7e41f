//! Frequency-domain compensator synthesis for unity-feedback loops.
//!
//! - `design_lead`: phase-lead network for a phase-margin target
//! - `design_lag`: phase-lag network for a velocity-constant target, with a
//!   bounded fixed-point refinement of the zero placement
//! - `design_lag_lead`: lag stage for Kv, then lead stage for phase margin
//!
//! Every design reports before/after performance and comparison plots.

pub mod error;
pub mod lag;
pub mod lag_lead;
pub mod lead;
pub mod options;
pub mod performance;

pub use error::{DesignError, DesignResult};
pub use lag::{LagCompensator, design_lag, lag_phase_deg, lag_ratio};
pub use lag_lead::{LagLeadCompensator, design_lag_lead};
pub use lead::{LeadCompensator, design_lead};
pub use options::DesignOptions;
pub use performance::{
    BodeComparison, Design, DesignPlots, Performance, PerformanceRecord, StepComparison,
};
