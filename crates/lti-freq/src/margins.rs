//! Gain and phase margins.

use lti_core::{TransferFunction, wrap_degrees};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FreqResult;
use crate::grid::{FrequencyOptions, frequency_grid, frequency_range};
use crate::response::FactoredResponse;

/// `None` means the corresponding crossing does not exist (infinite margin).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityMargins {
    pub gain_margin_db: Option<f64>,
    pub phase_margin_deg: Option<f64>,
    pub gain_crossover_freq: Option<f64>,
    pub phase_crossover_freq: Option<f64>,
}

/// Bisection on `f` over `[a, b]` in log-frequency, assuming a sign change.
fn bisect_log(f: impl Fn(f64) -> f64, mut a: f64, mut b: f64, iterations: usize) -> f64 {
    let mut fa = f(a);
    for _ in 0..iterations {
        let m = (a * b).sqrt();
        let fm = f(m);
        if fm == 0.0 {
            return m;
        }
        if (fa < 0.0) == (fm < 0.0) {
            a = m;
            fa = fm;
        } else {
            b = m;
        }
    }
    (a * b).sqrt()
}

/// First sign change of `f` over consecutive grid samples, refined.
fn first_root(f: impl Fn(f64) -> f64, grid: &[f64], iterations: usize) -> Option<f64> {
    let values: Vec<f64> = grid.iter().map(|w| f(*w)).collect();
    for i in 0..grid.len().saturating_sub(1) {
        let (fa, fb) = (values[i], values[i + 1]);
        if !(fa.is_finite() && fb.is_finite()) {
            continue;
        }
        if fa == 0.0 {
            return Some(grid[i]);
        }
        if (fa < 0.0) != (fb < 0.0) || fb == 0.0 {
            return Some(bisect_log(&f, grid[i], grid[i + 1], iterations));
        }
    }
    None
}

/// Smallest `ω` on the grid span where `|H(jω)| = level`.
pub fn magnitude_crossing(
    resp: &FactoredResponse,
    grid: &[f64],
    level: f64,
    iterations: usize,
) -> Option<f64> {
    let ln_level = level.ln();
    first_root(|w| resp.eval(w).norm().ln() - ln_level, grid, iterations)
}

/// Smallest `ω` where the phase is −180° (mod 360°): `Im H = 0` with `Re H < 0`.
pub fn phase_crossover(resp: &FactoredResponse, grid: &[f64], iterations: usize) -> Option<f64> {
    let im = |w: f64| resp.eval(w).im;
    let values: Vec<f64> = grid.iter().map(|w| im(*w)).collect();
    for i in 0..grid.len().saturating_sub(1) {
        let (fa, fb) = (values[i], values[i + 1]);
        if !(fa.is_finite() && fb.is_finite()) || fa == 0.0 {
            continue;
        }
        if (fa < 0.0) != (fb < 0.0) || fb == 0.0 {
            let w = bisect_log(im, grid[i], grid[i + 1], iterations);
            let h = resp.eval(w);
            if h.re < 0.0 && h.norm().is_finite() {
                return Some(w);
            }
        }
    }
    None
}

/// Search grid for crossings: the analysis range extended by
/// `margin_extension_decades` on both sides.
pub fn margin_grid(resp: &FactoredResponse, opts: &FrequencyOptions) -> FreqResult<Vec<f64>> {
    let (lo, hi) = frequency_range(&resp.corner_frequencies(), opts);
    let ext = 10f64.powf(opts.margin_extension_decades);
    frequency_grid(
        lo / ext,
        hi * ext,
        &FrequencyOptions {
            max_points: opts.max_points * 2,
            ..opts.clone()
        },
    )
}

pub fn margins(resp: &FactoredResponse, opts: &FrequencyOptions) -> FreqResult<StabilityMargins> {
    let grid = margin_grid(resp, opts)?;

    let gain_crossover_freq = magnitude_crossing(resp, &grid, 1.0, opts.bisection_iterations);
    let phase_crossover_freq = phase_crossover(resp, &grid, opts.bisection_iterations);
    let phase_margin_deg = gain_crossover_freq.map(|w| wrap_degrees(180.0 + resp.phase_deg(w)));
    let gain_margin_db = phase_crossover_freq
        .map(|w| -20.0 * resp.eval(w).norm().log10())
        .filter(|g| g.is_finite());

    debug!(
        ?gain_crossover_freq,
        ?phase_crossover_freq,
        ?phase_margin_deg,
        ?gain_margin_db,
        "stability margins"
    );
    Ok(StabilityMargins {
        gain_margin_db,
        phase_margin_deg,
        gain_crossover_freq,
        phase_crossover_freq,
    })
}

/// Margins of a transfer function's open loop.
pub fn stability_margins(
    tf: &TransferFunction,
    opts: &FrequencyOptions,
) -> FreqResult<StabilityMargins> {
    margins(&FactoredResponse::from_tf(tf)?, opts)
}
