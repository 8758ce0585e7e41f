//! Phase-plane behaviour of low-order LTI systems.
//!
//! The transfer function is realized in companion form and treated as an
//! autonomous system. The equilibrium at the origin is classified from the
//! dominant eigenvalues, and a grid of initial conditions is integrated with
//! fixed-step RK4 to sketch the flow.

pub mod classify;
pub mod error;
pub mod portrait;

pub use classify::{EquilibriumAnalysis, EquilibriumType, classify_equilibrium};
pub use error::{PortraitError, PortraitResult};
pub use portrait::{PhasePortrait, PortraitOptions, Trajectory, phase_portrait, portrait_horizon};
