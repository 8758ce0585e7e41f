//! Inverse analysis: recover the standard second-order parameters
//! `ωn² / (s² + 2ζωn s + ωn²)` from desired step-response figures.
//!
//! Relations used (underdamped, 0 < ζ < 1):
//! - overshoot % = 100·exp(−ζπ/√(1−ζ²))
//! - peak time = π / (ωn√(1−ζ²))
//! - settling time (2 %) ≈ 4 / (ζωn)
//! - rise time (10–90 %) ≈ (1 − 0.4167ζ + 2.917ζ²) / ωn

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InverseRequest {
    #[serde(default)]
    pub rise_time: Option<f64>,
    #[serde(default)]
    pub peak_time: Option<f64>,
    /// Percent, e.g. `5.0` for 5 %
    #[serde(default)]
    pub max_overshoot: Option<f64>,
    #[serde(default)]
    pub settling_time: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InverseResult {
    pub damping_ratio: Option<f64>,
    pub natural_frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl InverseResult {
    fn null(message: impl Into<String>) -> Self {
        Self {
            damping_ratio: None,
            natural_frequency: None,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InverseOptions {
    /// Relative mismatch tolerated between a supplied metric and its prediction
    pub consistency_tolerance: f64,
    /// Grid resolution used to bracket non-monotone relations
    pub scan_points: usize,
    pub bisection_iterations: usize,
}

impl Default for InverseOptions {
    fn default() -> Self {
        Self {
            consistency_tolerance: 0.1,
            scan_points: 400,
            bisection_iterations: 100,
        }
    }
}

/// Normalized 10–90 % rise time `tr·ωn`.
pub fn normalized_rise_time(zeta: f64) -> f64 {
    1.0 - 0.4167 * zeta + 2.917 * zeta * zeta
}

pub fn overshoot_percent(zeta: f64) -> f64 {
    100.0 * (-zeta * PI / (1.0 - zeta * zeta).sqrt()).exp()
}

pub fn peak_time(zeta: f64, wn: f64) -> f64 {
    PI / (wn * (1.0 - zeta * zeta).sqrt())
}

pub fn settling_time(zeta: f64, wn: f64) -> f64 {
    4.0 / (zeta * wn)
}

pub fn rise_time(zeta: f64, wn: f64) -> f64 {
    normalized_rise_time(zeta) / wn
}

/// Solve for `(ζ, ωn)`; never fails, returning a null result with a message
/// when the figures are missing, invalid or mutually inconsistent.
pub fn inverse_analyze(req: &InverseRequest, opts: &InverseOptions) -> InverseResult {
    let supplied = [
        ("rise_time", req.rise_time),
        ("peak_time", req.peak_time),
        ("max_overshoot", req.max_overshoot),
        ("settling_time", req.settling_time),
    ];
    if supplied.iter().all(|(_, v)| v.is_none()) {
        return InverseResult::null("No time-domain metrics supplied.");
    }
    for (name, v) in supplied {
        if let Some(v) = v
            && !(v.is_finite() && v > 0.0)
        {
            return InverseResult::null(format!("{name} must be a positive finite number."));
        }
    }

    let zeta = match solve_zeta(req, opts) {
        Ok(z) => z,
        Err(msg) => return InverseResult::null(msg),
    };
    if !(zeta > 0.0 && zeta < 1.0) {
        return InverseResult::null(format!(
            "Damping ratio {zeta:.4} is outside (0, 1); the metrics do not describe an underdamped second-order system."
        ));
    }

    let wn = if let Some(tp) = req.peak_time {
        PI / (tp * (1.0 - zeta * zeta).sqrt())
    } else if let Some(ts) = req.settling_time {
        4.0 / (zeta * ts)
    } else if let Some(tr) = req.rise_time {
        normalized_rise_time(zeta) / tr
    } else {
        return InverseResult::null(
            "Insufficient metrics: overshoot alone fixes the damping ratio but not the natural frequency.",
        );
    };
    if !(wn.is_finite() && wn > 0.0) {
        return InverseResult::null("Natural frequency is not positive.");
    }

    let predictions = [
        ("rise_time", req.rise_time, rise_time(zeta, wn)),
        ("peak_time", req.peak_time, peak_time(zeta, wn)),
        ("max_overshoot", req.max_overshoot, overshoot_percent(zeta)),
        ("settling_time", req.settling_time, settling_time(zeta, wn)),
    ];
    for (name, given, predicted) in predictions {
        if let Some(given) = given {
            let rel = (predicted - given).abs() / given.abs();
            if rel > opts.consistency_tolerance {
                debug!(name, given, predicted, "inconsistent inverse metrics");
                return InverseResult::null(format!(
                    "Inconsistent metrics: {name} = {given} but the solved system gives {predicted:.4}."
                ));
            }
        }
    }

    InverseResult {
        damping_ratio: Some(zeta),
        natural_frequency: Some(wn),
        message: String::new(),
    }
}

fn solve_zeta(req: &InverseRequest, opts: &InverseOptions) -> Result<f64, String> {
    if let Some(os) = req.max_overshoot {
        if os >= 100.0 {
            return Ok(0.0);
        }
        let ln_mp = (os / 100.0).ln();
        return Ok(-ln_mp / (PI * PI + ln_mp * ln_mp).sqrt());
    }

    match (req.rise_time, req.peak_time, req.settling_time) {
        (_, Some(tp), Some(ts)) => {
            // ts/tp = 4√(1−ζ²)/(πζ)
            let r = ts / tp;
            Ok(4.0 / (16.0 + r * r * PI * PI).sqrt())
        }
        (Some(tr), None, Some(ts)) => {
            // ζ·f(ζ) = 4·tr/ts, increasing in ζ
            let target = 4.0 * tr / ts;
            bisect(|z| z * normalized_rise_time(z) - target, 1e-9, 1.0 - 1e-9, opts)
                .ok_or_else(|| "Rise and settling times admit no underdamped solution.".to_string())
        }
        (Some(tr), Some(tp), None) => {
            // tr/tp = f(ζ)√(1−ζ²)/π, not monotone: scan for the first bracket
            let target = tr / tp;
            let g = |z: f64| normalized_rise_time(z) * (1.0 - z * z).sqrt() / PI - target;
            let n = opts.scan_points.max(2);
            let lo = 1e-9;
            let hi = 1.0 - 1e-9;
            let step = (hi - lo) / n as f64;
            (0..n)
                .map(|i| (lo + i as f64 * step, lo + (i + 1) as f64 * step))
                .find(|(a, b)| g(*a) * g(*b) <= 0.0)
                .and_then(|(a, b)| bisect(g, a, b, opts))
                .ok_or_else(|| "Rise and peak times admit no underdamped solution.".to_string())
        }
        _ => Err(
            "Insufficient metrics: supply the overshoot, or two of rise, peak and settling time."
                .to_string(),
        ),
    }
}

fn bisect(f: impl Fn(f64) -> f64, mut a: f64, mut b: f64, opts: &InverseOptions) -> Option<f64> {
    let mut fa = f(a);
    let fb = f(b);
    if fa * fb > 0.0 {
        return None;
    }
    for _ in 0..opts.bisection_iterations {
        let m = 0.5 * (a + b);
        let fm = f(m);
        if fa * fm <= 0.0 {
            b = m;
        } else {
            a = m;
            fa = fm;
        }
    }
    Some(0.5 * (a + b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn overshoot_and_peak_time() {
        let zeta = 0.5;
        let wn = 2.0;
        let req = InverseRequest {
            max_overshoot: Some(overshoot_percent(zeta)),
            peak_time: Some(peak_time(zeta, wn)),
            ..InverseRequest::default()
        };
        let res = inverse_analyze(&req, &InverseOptions::default());
        assert!(close(res.damping_ratio.unwrap(), zeta, 1e-9));
        assert!(close(res.natural_frequency.unwrap(), wn, 1e-9));
        assert!(res.message.is_empty());
    }

    #[test]
    fn peak_and_settling_closed_form() {
        let req = InverseRequest {
            peak_time: Some(peak_time(0.3, 5.0)),
            settling_time: Some(settling_time(0.3, 5.0)),
            ..InverseRequest::default()
        };
        let res = inverse_analyze(&req, &InverseOptions::default());
        assert!(close(res.damping_ratio.unwrap(), 0.3, 1e-9));
        assert!(close(res.natural_frequency.unwrap(), 5.0, 1e-9));
    }

    #[test]
    fn rise_and_settling_by_bisection() {
        let req = InverseRequest {
            rise_time: Some(rise_time(0.6, 3.0)),
            settling_time: Some(settling_time(0.6, 3.0)),
            ..InverseRequest::default()
        };
        let res = inverse_analyze(&req, &InverseOptions::default());
        assert!(close(res.damping_ratio.unwrap(), 0.6, 1e-6));
        assert!(close(res.natural_frequency.unwrap(), 3.0, 1e-5));
    }

    #[test]
    fn rise_and_peak_takes_lowest_root() {
        let req = InverseRequest {
            rise_time: Some(rise_time(0.4, 1.0)),
            peak_time: Some(peak_time(0.4, 1.0)),
            ..InverseRequest::default()
        };
        let res = inverse_analyze(&req, &InverseOptions::default());
        assert!(close(res.damping_ratio.unwrap(), 0.4, 1e-6));
    }

    #[test]
    fn inconsistent_metrics_yield_null() {
        let req = InverseRequest {
            max_overshoot: Some(overshoot_percent(0.5)),
            peak_time: Some(peak_time(0.5, 2.0)),
            settling_time: Some(100.0),
            ..InverseRequest::default()
        };
        let res = inverse_analyze(&req, &InverseOptions::default());
        assert_eq!(res.damping_ratio, None);
        assert_eq!(res.natural_frequency, None);
        assert!(res.message.contains("Inconsistent"));
    }

    #[test]
    fn degenerate_inputs_yield_null() {
        let opts = InverseOptions::default();
        assert!(inverse_analyze(&InverseRequest::default(), &opts).damping_ratio.is_none());

        let only_overshoot = InverseRequest {
            max_overshoot: Some(10.0),
            ..InverseRequest::default()
        };
        assert!(inverse_analyze(&only_overshoot, &opts).natural_frequency.is_none());

        let total_overshoot = InverseRequest {
            max_overshoot: Some(100.0),
            peak_time: Some(1.0),
            ..InverseRequest::default()
        };
        assert!(inverse_analyze(&total_overshoot, &opts).damping_ratio.is_none());

        let negative = InverseRequest {
            peak_time: Some(-1.0),
            settling_time: Some(2.0),
            ..InverseRequest::default()
        };
        assert!(inverse_analyze(&negative, &opts).damping_ratio.is_none());
    }
}
