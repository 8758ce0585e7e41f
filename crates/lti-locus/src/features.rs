//! Structural features of the locus: asymptotes, breakaway/break-in points
//! and imaginary-axis crossings.

use lti_core::{Complex64, Polynomial};
use lti_stability::{RouthOptions, build_routh};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LocusResult;
use crate::locus::{Asymptotes, LocusPoint};

/// Candidates with `|Im| <= REAL_TOL * max(1, |s|)` are real.
const REAL_TOL: f64 = 1e-5;
/// Closed-loop roots this close (relative) to the jω axis count as crossings.
const AXIS_TOL: f64 = 1e-5;
/// Reported points are deduplicated on this grid.
const DEDUP_GRID: f64 = 1e-5;

/// Point where a branch meets the imaginary axis, with the gain there.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisCrossing {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

fn is_real(s: Complex64) -> bool {
    s.im.abs() <= REAL_TOL * s.norm().max(1.0)
}

fn snap(v: f64) -> f64 {
    (v / DEDUP_GRID).round() * DEDUP_GRID + 0.0
}

/// Centroid and angles of the asymptotes; `None` without excess poles.
pub fn asymptotes(zeros: &[Complex64], poles: &[Complex64]) -> Option<Asymptotes> {
    if poles.len() <= zeros.len() {
        return None;
    }
    let excess = poles.len() - zeros.len();
    let sum_p: f64 = poles.iter().map(|p| p.re).sum();
    let sum_z: f64 = zeros.iter().map(|z| z.re).sum();
    let angles = (0..excess)
        .map(|q| (2 * q + 1) as f64 * 180.0 / excess as f64)
        .collect();
    Some(Asymptotes {
        centroid: (sum_p - sum_z) / excess as f64,
        angles,
    })
}

/// Real-axis locus rule: an odd number of real poles and zeros to the right.
fn on_real_segment(x: f64, zeros: &[Complex64], poles: &[Complex64]) -> bool {
    let right = zeros
        .iter()
        .chain(poles)
        .filter(|p| is_real(**p) && p.re > x)
        .count();
    right % 2 == 1
}

/// Breakaway and break-in points: roots of `N·D′ − D·N′` where
/// `K = −D/N` is real and positive.
///
/// Real candidates must also sit on a real-axis segment of the locus.
/// Complex candidates (branches meeting off the axis) are kept when the gain
/// condition holds. Output is deduplicated and sorted by `(x, y)`.
pub fn breakaway_points(
    num: &Polynomial,
    den: &Polynomial,
    zeros: &[Complex64],
    poles: &[Complex64],
) -> LocusResult<Vec<LocusPoint>> {
    let condition = &(num * &den.derivative()) - &(den * &num.derivative());
    if condition.degree() == 0 {
        return Ok(Vec::new());
    }

    let mut points: Vec<LocusPoint> = Vec::new();
    for s in condition.roots()? {
        let n = num.eval_complex(s);
        if n.norm() == 0.0 {
            continue;
        }
        let k = -den.eval_complex(s) / n;
        if !(k.re.is_finite() && k.im.abs() <= REAL_TOL * k.norm().max(1.0) && k.re > 0.0) {
            continue;
        }
        let point = if is_real(s) {
            if !on_real_segment(s.re, zeros, poles) {
                continue;
            }
            LocusPoint::new(snap(s.re), 0.0)
        } else {
            LocusPoint::new(snap(s.re), snap(s.im))
        };
        if !points.contains(&point) {
            points.push(point);
        }
    }
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    debug!(count = points.len(), "breakaway points");
    Ok(points)
}

/// Gains and frequencies where the locus crosses the imaginary axis.
///
/// The Routh array of `D(s) + K·N(s)` is built with entries polynomial in
/// `K`. Every positive real root of a first-column numerator is a candidate
/// gain; a candidate is kept when the closed-loop polynomial at that gain has
/// a root on the jω axis with `ω > 0`. Both `±ω` are reported, sorted by `y`.
pub fn imaginary_axis_crossings(
    num: &Polynomial,
    den: &Polynomial,
    opts: &RouthOptions,
) -> LocusResult<Vec<AxisCrossing>> {
    let degree = den.degree().max(num.degree());
    let coeffs: Vec<Polynomial> = (0..=degree)
        .rev()
        .map(|p| Polynomial::new(vec![num.coeff_of_power(p), den.coeff_of_power(p)]))
        .collect();
    let array = build_routh(&coeffs, opts)?;

    let mut candidates: Vec<f64> = Vec::new();
    for row in &array.rows {
        let first = row.first();
        if first.degree() == 0 {
            continue;
        }
        for k in first.real_roots()? {
            if k > 0.0
                && k.is_finite()
                && !candidates.iter().any(|c| (c - k).abs() <= 1e-9 * k.max(1.0))
            {
                candidates.push(k);
            }
        }
    }

    let mut crossings: Vec<AxisCrossing> = Vec::new();
    for k in candidates {
        let characteristic = den + &num.scale(k);
        for r in characteristic.roots()? {
            if r.im <= 0.0 || r.re.abs() > AXIS_TOL * r.norm().max(1.0) {
                continue;
            }
            for y in [r.im, -r.im] {
                let c = AxisCrossing {
                    x: 0.0,
                    y: snap(y),
                    k,
                };
                let duplicate = crossings
                    .iter()
                    .any(|o| o.y == c.y && (o.k - k).abs() <= DEDUP_GRID * k.max(1.0));
                if !duplicate {
                    crossings.push(c);
                }
            }
        }
    }
    crossings.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.k.total_cmp(&b.k)));
    debug!(count = crossings.len(), "imaginary-axis crossings");
    Ok(crossings)
}
