//! Routh–Hurwitz stability analysis.
//!
//! Contains:
//! - expr (coefficient expressions in at most one free variable)
//! - interval (unions of open real intervals)
//! - routh (array construction over polynomial entries, degenerate-case recovery)
//! - range (numeric verdicts and single-variable stability ranges)
//! - error (analyzer error types)

pub mod error;
pub mod expr;
pub mod interval;
pub mod range;
pub mod routh;

pub use error::{StabilityError, StabilityResult};
pub use expr::{ParsedCoefficients, parse_coefficients};
pub use interval::{Interval, IntervalSet, positive_set};
pub use range::{
    NumericRouth, RouthVerdict, StabilityRange, SymbolicRouth, analyze_stability_range,
    routh_numeric, routh_symbolic,
};
pub use routh::{RouthArray, RouthNote, RouthOptions, RouthRow, build_routh};
