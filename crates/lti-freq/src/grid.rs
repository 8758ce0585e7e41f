//! Frequency grids.

use lti_core::{log_sweep, points_for_decades};
use serde::{Deserialize, Serialize};

use crate::error::FreqResult;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyOptions {
    pub points_per_decade: usize,
    /// Decades added below the smallest and above the largest corner
    pub decade_padding: f64,
    /// Range used when there are no corner frequencies
    pub default_min_omega: f64,
    pub default_max_omega: f64,
    /// Upper bound on the number of samples in one sweep
    pub max_points: usize,
    /// Extra decades on each side of the margin search sweep
    pub margin_extension_decades: f64,
    pub bisection_iterations: usize,
    /// Nyquist indentation radius around imaginary-axis poles, relative to `max(1, |p|)`
    pub indentation_radius: f64,
}

impl Default for FrequencyOptions {
    fn default() -> Self {
        Self {
            points_per_decade: 100,
            decade_padding: 2.0,
            default_min_omega: 1e-2,
            default_max_omega: 1e2,
            max_points: 4000,
            margin_extension_decades: 3.0,
            bisection_iterations: 80,
            indentation_radius: 1e-3,
        }
    }
}

/// Sweep bounds from the corner frequencies: `decade_padding` decades below
/// the smallest and above the largest, on decade boundaries.
pub fn frequency_range(corners: &[f64], opts: &FrequencyOptions) -> (f64, f64) {
    let finite: Vec<f64> = corners
        .iter()
        .copied()
        .filter(|c| c.is_finite() && *c > 0.0)
        .collect();
    let (Some(lo), Some(hi)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return (opts.default_min_omega, opts.default_max_omega);
    };
    let lo = 10f64.powf(lo.log10().floor() - opts.decade_padding);
    let hi = 10f64.powf(hi.log10().ceil() + opts.decade_padding);
    (lo, hi)
}

/// Logarithmic grid over `[lo, hi]` at the configured density, capped at
/// `max_points`.
pub fn frequency_grid(lo: f64, hi: f64, opts: &FrequencyOptions) -> FreqResult<Vec<f64>> {
    let n = points_for_decades(lo, hi, opts.points_per_decade.max(1))
        .min(opts.max_points)
        .max(2);
    Ok(log_sweep(lo, hi, n)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_pads_two_decades() {
        let opts = FrequencyOptions::default();
        let (lo, hi) = frequency_range(&[0.5, 30.0], &opts);
        assert!((lo - 1e-3).abs() < 1e-15);
        assert!((hi - 1e4).abs() < 1e-6);
    }

    #[test]
    fn default_range_without_corners() {
        let opts = FrequencyOptions::default();
        assert_eq!(frequency_range(&[], &opts), (1e-2, 1e2));
    }

    #[test]
    fn grid_density_and_cap() {
        let mut opts = FrequencyOptions::default();
        let g = frequency_grid(1e-2, 1e2, &opts).unwrap();
        assert_eq!(g.len(), 401);
        opts.max_points = 50;
        assert_eq!(frequency_grid(1e-2, 1e2, &opts).unwrap().len(), 50);
    }
}
