//! lti-core: shared foundation for the LTI analysis engines.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - polynomial (real-coefficient polynomials, arithmetic, root finding)
//! - transfer_function (validated rational transfer functions)
//! - complex (serializable complex points)
//! - sweep (linear and logarithmic grids)
//! - error (shared error types)

pub mod complex;
pub mod error;
pub mod numeric;
pub mod polynomial;
pub mod sweep;
pub mod transfer_function;

// Re-exports: nice ergonomics for downstream crates
pub use complex::ComplexPoint;
pub use error::{LtiError, LtiResult};
pub use num_complex::Complex64;
pub use numeric::*;
pub use polynomial::Polynomial;
pub use sweep::{linear_sweep, log_sweep, points_for_decades};
pub use transfer_function::TransferFunction;
