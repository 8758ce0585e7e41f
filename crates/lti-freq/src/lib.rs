//! Frequency-response engine.
//!
//! Provides:
//! - `FactoredResponse`: gain/zero/pole form with exact evaluation on the jω axis
//! - Bode data with straight-line asymptotes
//! - Nyquist trace with a low-frequency asymptote descriptor and indentations
//! - gain/phase margins refined by bisection, DC gain

pub mod analysis;
pub mod bode;
pub mod error;
pub mod grid;
pub mod margins;
pub mod nyquist;
pub mod response;

pub use analysis::{FrequencyAnalysis, analyze, analyze_zpk};
pub use bode::{BodeData, bode_asymptotes, bode_on_grid};
pub use error::{FreqError, FreqResult};
pub use grid::{FrequencyOptions, frequency_grid, frequency_range};
pub use margins::{
    StabilityMargins, magnitude_crossing, margin_grid, margins, phase_crossover, stability_margins,
};
pub use nyquist::{Indentation, NyquistAsymptote, NyquistData, nyquist_asymptote, nyquist_on_grid};
pub use response::FactoredResponse;
