//! Bode magnitude/phase data and the straight-line magnitude asymptote.

use lti_core::unwrap_degrees;
use serde::{Deserialize, Serialize};

use crate::response::FactoredResponse;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodeData {
    pub omega: Vec<f64>,
    pub magnitude_db: Vec<f64>,
    /// Degrees, continuously unwrapped
    pub phase_deg: Vec<f64>,
    pub asymptote_omega: Vec<f64>,
    pub asymptote_magnitude_db: Vec<f64>,
    pub corner_frequencies: Vec<f64>,
}

/// Sample magnitude and phase on `grid` and build the asymptote over it.
pub fn bode_on_grid(resp: &FactoredResponse, grid: &[f64]) -> BodeData {
    let magnitude_db = grid.iter().map(|w| resp.magnitude_db(*w)).collect();
    let mut phase_deg: Vec<f64> = grid.iter().map(|w| resp.phase_deg(*w)).collect();
    unwrap_degrees(&mut phase_deg);

    let corner_frequencies = resp.corner_frequencies();
    let (asymptote_omega, asymptote_magnitude_db) = match (grid.first(), grid.last()) {
        (Some(start), Some(end)) => bode_asymptotes(resp, *start, *end),
        _ => (Vec::new(), Vec::new()),
    };

    BodeData {
        omega: grid.to_vec(),
        magnitude_db,
        phase_deg,
        asymptote_omega,
        asymptote_magnitude_db,
        corner_frequencies,
    }
}

/// Straight-line magnitude asymptote over `[start, end]`.
///
/// Starts from the low-frequency form `K / s^n` (`n` net integrators, `K`
/// with the origin factors removed), so the line passes through
/// `20·log10|K|` at `ω = 1` with slope `−20·n` dB/decade. Each corner
/// frequency inside the range bends the slope by −20 dB/decade per pole and
/// +20 dB/decade per zero located there. Empty when `K` is zero.
pub fn bode_asymptotes(resp: &FactoredResponse, start: f64, end: f64) -> (Vec<f64>, Vec<f64>) {
    let k = resp.low_frequency_gain().abs();
    if !(k > 0.0 && k.is_finite() && start > 0.0 && end > start) {
        return (Vec::new(), Vec::new());
    }

    // (corner, slope change in dB/decade)
    let mut bends: Vec<(f64, f64)> = Vec::new();
    let origin = resp.origin_tolerance;
    let factors = resp
        .poles
        .iter()
        .map(|p| (p, -20.0))
        .chain(resp.zeros.iter().map(|z| (z, 20.0)));
    for (root, delta) in factors {
        let wc = root.norm();
        if wc <= origin {
            continue;
        }
        match bends
            .iter_mut()
            .find(|(w, _)| (w - wc).abs() <= 1e-9 * wc.max(1.0))
        {
            Some(bend) => bend.1 += delta,
            None => bends.push((wc, delta)),
        }
    }
    bends.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut slope = -20.0 * resp.integrators() as f64;
    let mut omega = vec![start];
    let mut mag = vec![20.0 * k.log10() + slope * start.log10()];
    for (wc, delta) in bends {
        if wc < start || wc > end {
            continue;
        }
        let (last_w, last_m) = (omega[omega.len() - 1], mag[mag.len() - 1]);
        omega.push(wc);
        mag.push(last_m + slope * (wc / last_w).log10());
        slope += delta;
    }
    let (last_w, last_m) = (omega[omega.len() - 1], mag[mag.len() - 1]);
    if end > last_w {
        omega.push(end);
        mag.push(last_m + slope * (end / last_w).log10());
    }
    (omega, mag)
}
