//! Fixed-step simulation substrate for LTI systems.
//!
//! Provides:
//! - the `TransientModel` trait for pluggable dynamic systems
//! - fixed-step RK4 and forward Euler integrators
//! - a simulation runner with decimation and early stop
//! - phase-variable companion state-space realization with exact
//!   zero-order-hold stepping for stiff systems
//! - unit-step response of a transfer function

pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod state_space;
pub mod step;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use model::TransientModel;
pub use sim::{IntegratorType, SimOptions, SimRecord, run_map_until, run_sim, run_sim_until};
pub use state_space::{HoldMap, LinearModel, LinearScheme, StateSpace};
pub use step::{StepOptions, StepResponse, StepRun, simulate_step, step_horizon, step_response};
