//! Root-locus assembly: validated input, traced branches and features.

use lti_core::{Complex64, ComplexPoint};
use lti_stability::RouthOptions;
use serde::{Deserialize, Serialize};
use tracing::info_span;

use crate::error::{LocusError, LocusResult};
use crate::features::{AxisCrossing, asymptotes, breakaway_points, imaginary_axis_crossings};
use crate::input::prepare_input;
use crate::tracking::{gain_grid, trace_branches};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LocusOptions {
    /// Smallest positive gain, before scaling
    pub k_min: f64,
    /// Largest gain, before scaling
    pub k_max: f64,
    /// Positive gain samples (K = 0 is always added)
    pub samples: usize,
    /// Relative window within which nearest-root candidates count as tied
    pub tie_window: f64,
    /// Relative distance under which a pole and a zero cancel
    pub cancel_tolerance: f64,
    /// Upper bound on the automatic gain scale
    pub max_gain_scale: f64,
}

impl Default for LocusOptions {
    fn default() -> Self {
        Self {
            k_min: 1e-3,
            k_max: 1e5,
            samples: 4000,
            tie_window: 0.1,
            cancel_tolerance: 1e-9,
            max_gain_scale: 1e12,
        }
    }
}

/// `{x, y}` point in the s-plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocusPoint {
    pub x: f64,
    pub y: f64,
}

impl LocusPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Complex64> for LocusPoint {
    fn from(z: Complex64) -> Self {
        Self { x: z.re, y: z.im }
    }
}

/// One branch, sampled at increasing gains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub k: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asymptotes {
    pub centroid: f64,
    /// Degrees
    pub angles: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootLocus {
    pub message: String,
    pub branches: Vec<Branch>,
    pub zeros: Vec<LocusPoint>,
    pub poles: Vec<LocusPoint>,
    pub asymptotes: Option<Asymptotes>,
    pub breakaway_points: Vec<LocusPoint>,
    pub imag_axis_crossings: Vec<AxisCrossing>,
    /// Locations of cancelled pole/zero pairs
    pub cancelled: Vec<LocusPoint>,
}

/// Gain scale so the sweep reaches the region where branches settle:
/// `R^excess`, `R` the largest pole/zero magnitude (at least 1).
fn gain_scale(zeros: &[Complex64], poles: &[Complex64], cap: f64) -> f64 {
    let radius = zeros
        .iter()
        .chain(poles)
        .map(|p| p.norm())
        .fold(1.0, f64::max);
    let excess = poles.len().abs_diff(zeros.len()).max(1);
    radius.powi(excess as i32).min(cap.max(1.0))
}

/// Root locus of `1 + K·N(s)/D(s)` for `K >= 0`.
///
/// # Errors
///
/// `InvalidInput` for an empty pole set, unpaired complex values or invalid
/// options.
pub fn root_locus(
    zeros: &[ComplexPoint],
    poles: &[ComplexPoint],
    opts: &LocusOptions,
) -> LocusResult<RootLocus> {
    if !(opts.k_min > 0.0 && opts.k_max > opts.k_min && opts.samples >= 2) {
        return Err(LocusError::InvalidInput {
            what: "locus options need 0 < k_min < k_max and at least 2 samples".to_string(),
        });
    }
    let input = prepare_input(zeros, poles, opts.cancel_tolerance)?;
    let _span = info_span!("root_locus", branches = input.branch_count()).entered();

    let scale = gain_scale(&input.zeros, &input.poles, opts.max_gain_scale);
    let gains = gain_grid(opts.k_min * scale, opts.k_max * scale, opts.samples)?;
    let traced = trace_branches(&input.num, &input.den, &input.poles, &gains, opts.tie_window)?;

    let branches = traced
        .into_iter()
        .map(|b| Branch {
            x: b.points.iter().map(|p| p.re).collect(),
            y: b.points.iter().map(|p| p.im).collect(),
            k: b.gains,
        })
        .collect();

    let breakaway = breakaway_points(&input.num, &input.den, &input.zeros, &input.poles)?;
    let crossings = imaginary_axis_crossings(&input.num, &input.den, &RouthOptions::default())?;

    let message = if input.cancelled.is_empty() {
        "Root locus data calculated successfully".to_string()
    } else {
        format!(
            "Root locus data calculated successfully ({} coincident pole/zero pair(s) cancelled)",
            input.cancelled.len()
        )
    };

    Ok(RootLocus {
        message,
        branches,
        zeros: input.zeros.iter().map(|z| LocusPoint::from(*z)).collect(),
        poles: input.poles.iter().map(|p| LocusPoint::from(*p)).collect(),
        asymptotes: asymptotes(&input.zeros, &input.poles),
        breakaway_points: breakaway,
        imag_axis_crossings: crossings,
        cancelled: input.cancelled.iter().map(|c| LocusPoint::from(*c)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(f64, f64)]) -> Vec<ComplexPoint> {
        v.iter().map(|(r, i)| ComplexPoint::new(*r, *i)).collect()
    }

    fn small() -> LocusOptions {
        LocusOptions {
            samples: 600,
            ..LocusOptions::default()
        }
    }

    #[test]
    fn third_order_locus() {
        let res = root_locus(&[], &pts(&[(0.0, 0.0), (-1.0, 0.0), (-2.0, 0.0)]), &small()).unwrap();
        assert_eq!(res.branches.len(), 3);
        let a = res.asymptotes.as_ref().unwrap();
        assert!((a.centroid + 1.0).abs() < 1e-12);
        assert_eq!(a.angles.len(), 3);
        assert_eq!(res.breakaway_points.len(), 1);
        assert_eq!(res.imag_axis_crossings.len(), 2);
        assert!(res.cancelled.is_empty());
        assert_eq!(res.message, "Root locus data calculated successfully");
    }

    #[test]
    fn branches_begin_at_sorted_poles() {
        let res = root_locus(&[], &pts(&[(0.0, 0.0), (-1.0, 1.0), (-1.0, -1.0)]), &small()).unwrap();
        let starts: Vec<(f64, f64)> = res.branches.iter().map(|b| (b.x[0], b.y[0])).collect();
        assert_eq!(starts, vec![(-1.0, -1.0), (-1.0, 1.0), (0.0, 0.0)]);
        assert!(res.branches.iter().all(|b| b.k[0] == 0.0));
    }

    #[test]
    fn gains_increase_along_branches() {
        let res = root_locus(&pts(&[(-3.0, 0.0)]), &pts(&[(0.0, 0.0), (-1.0, 0.0)]), &small()).unwrap();
        for b in &res.branches {
            assert_eq!(b.x.len(), b.k.len());
            assert!(b.k.windows(2).all(|w| w[1] > w[0]));
        }
        // one branch ends near the zero
        let near_zero = res.branches.iter().any(|b| {
            let n = b.x.len() - 1;
            (b.x[n] + 3.0).abs() < 1e-2 && b.y[n].abs() < 1e-2
        });
        assert!(near_zero);
    }

    #[test]
    fn cancellation_is_reported() {
        let res = root_locus(
            &pts(&[(-1.0, 0.0)]),
            &pts(&[(-1.0, 0.0), (-2.0, 0.0)]),
            &small(),
        )
        .unwrap();
        assert_eq!(res.cancelled, vec![LocusPoint::new(-1.0, 0.0)]);
        assert_eq!(res.branches.len(), 1);
        assert!(res.message.contains("cancelled"));
    }

    #[test]
    fn invalid_options_rejected() {
        let opts = LocusOptions {
            k_min: 0.0,
            ..LocusOptions::default()
        };
        assert!(root_locus(&[], &pts(&[(-1.0, 0.0)]), &opts).is_err());
    }
}
