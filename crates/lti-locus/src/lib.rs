//! Root-locus engine for `den(s) + K·num(s) = 0`, `K >= 0`.
//!
//! Provides:
//! - input validation and pole/zero cancellation
//! - branch tracing over a geometric gain sweep with continuity-preserving assignment
//! - asymptotes, breakaway/break-in points and imaginary-axis crossings

pub mod error;
pub mod features;
pub mod input;
pub mod locus;
pub mod tracking;

pub use error::{LocusError, LocusResult};
pub use features::{AxisCrossing, asymptotes, breakaway_points, imaginary_axis_crossings};
pub use input::{LocusInput, prepare_input};
pub use locus::{Asymptotes, Branch, LocusOptions, LocusPoint, RootLocus, root_locus};
pub use tracking::{TrackedBranch, gain_grid, trace_branches};
