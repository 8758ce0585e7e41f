//! Branch continuation over a gain sweep.
//!
//! At each gain the closed-loop roots are matched to the branches greedily:
//! the globally closest (branch, root) pair is taken first. Pairs whose
//! distance lies within `tie_window` (relative) of that best distance are
//! treated as tied and ranked by distance to the branch's linearly
//! extrapolated position, so a branch keeps its direction of travel through
//! near-coincident roots. Remaining exact ties go to the lower branch index,
//! then the lower root index.

use lti_core::{Complex64, LtiError, Polynomial, log_sweep};
use tracing::debug;

use crate::error::LocusResult;

/// One branch as traced, before conversion to the output shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackedBranch {
    pub points: Vec<Complex64>,
    pub gains: Vec<f64>,
}

impl TrackedBranch {
    fn last(&self) -> Option<Complex64> {
        self.points.last().copied()
    }

    fn predicted(&self) -> Option<Complex64> {
        match self.points.as_slice() {
            [] => None,
            [only] => Some(*only),
            [.., prev, last] => Some(*last * 2.0 - *prev),
        }
    }
}

/// `K = 0` followed by `samples` geometric gains in `[k_min, k_max]`.
pub fn gain_grid(k_min: f64, k_max: f64, samples: usize) -> LocusResult<Vec<f64>> {
    let mut grid = Vec::with_capacity(samples + 1);
    grid.push(0.0);
    grid.extend(log_sweep(k_min, k_max, samples)?);
    Ok(grid)
}

/// Trace the roots of `den + K·num` over `gains`.
///
/// Branch `i < poles.len()` starts at `poles[i]` for `K = 0`. When the
/// numerator has the higher degree the extra branches come in from infinity
/// and start at the first positive gain.
pub fn trace_branches(
    num: &Polynomial,
    den: &Polynomial,
    poles: &[Complex64],
    gains: &[f64],
    tie_window: f64,
) -> LocusResult<Vec<TrackedBranch>> {
    let count = den.degree().max(num.degree());
    let mut branches: Vec<TrackedBranch> = (0..count)
        .map(|i| match poles.get(i) {
            Some(p) => TrackedBranch {
                points: vec![*p],
                gains: vec![0.0],
            },
            None => TrackedBranch::default(),
        })
        .collect();

    for &k in gains.iter().filter(|k| **k > 0.0) {
        let characteristic = den + &num.scale(k);
        let roots = characteristic.roots()?;
        if roots.len() != count {
            return Err(LtiError::Invariant {
                what: "closed-loop degree changed along the gain sweep",
            }
            .into());
        }
        for (b, j) in assign(&branches, &roots, tie_window).into_iter().enumerate() {
            if let Some(j) = j {
                branches[b].points.push(roots[j]);
                branches[b].gains.push(k);
            }
        }
    }

    debug!(branches = count, samples = gains.len(), "root locus traced");
    Ok(branches)
}

/// Root index for every branch (`None` when no root is left for it).
fn assign(branches: &[TrackedBranch], roots: &[Complex64], tie_window: f64) -> Vec<Option<usize>> {
    let mut out = vec![None; branches.len()];
    let mut free = vec![true; roots.len()];
    let mut open: Vec<usize> = (0..branches.len())
        .filter(|b| !branches[*b].points.is_empty())
        .collect();

    while !open.is_empty() && free.iter().any(|f| *f) {
        let mut best = f64::INFINITY;
        for &b in &open {
            if let Some(last) = branches[b].last() {
                for (j, r) in roots.iter().enumerate() {
                    if free[j] {
                        best = best.min((r - last).norm());
                    }
                }
            }
        }
        let window = best * (1.0 + tie_window) + f64::EPSILON;

        let mut choice: Option<(usize, usize, f64)> = None;
        for (pos, &b) in open.iter().enumerate() {
            let (Some(last), Some(pred)) = (branches[b].last(), branches[b].predicted()) else {
                continue;
            };
            for (j, r) in roots.iter().enumerate() {
                if !free[j] || (r - last).norm() > window {
                    continue;
                }
                let score = (r - pred).norm();
                if choice.is_none_or(|(_, _, s)| score < s) {
                    choice = Some((pos, j, score));
                }
            }
        }
        let Some((pos, j, _)) = choice else {
            break;
        };
        out[open[pos]] = Some(j);
        free[j] = false;
        open.remove(pos);
    }

    let mut fresh = (0..branches.len()).filter(|b| branches[*b].points.is_empty());
    for j in (0..roots.len()).filter(|j| free[*j]) {
        if let Some(b) = fresh.next() {
            out[b] = Some(j);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn grid_starts_at_zero() {
        let g = gain_grid(1e-2, 1e2, 5).unwrap();
        assert_eq!(g.len(), 6);
        assert_eq!(g[0], 0.0);
        assert!((g[1] - 1e-2).abs() < 1e-15);
        assert!((g[5] - 1e2).abs() < 1e-9);
        assert!(gain_grid(0.0, 1.0, 5).is_err());
    }

    #[test]
    fn nearest_root_wins() {
        let branches = vec![
            TrackedBranch {
                points: vec![c(0.0, 0.0)],
                gains: vec![0.0],
            },
            TrackedBranch {
                points: vec![c(-1.0, 0.0)],
                gains: vec![0.0],
            },
        ];
        let roots = [c(-0.9, 0.0), c(-0.1, 0.0)];
        assert_eq!(assign(&branches, &roots, 0.1), vec![Some(1), Some(0)]);
    }

    #[test]
    fn tie_broken_by_direction_of_travel() {
        // moving right along the real axis, two roots equidistant from the last sample
        let branches = vec![TrackedBranch {
            points: vec![c(-1.0, 0.0), c(-0.5, 0.0)],
            gains: vec![0.0, 1.0],
        }];
        let roots = [c(-0.5, 0.5), c(0.0, 0.0)];
        let distances: Vec<f64> = roots.iter().map(|r| (r - c(-0.5, 0.0)).norm()).collect();
        assert!((distances[0] - distances[1]).abs() < 1e-12);
        assert_eq!(assign(&branches, &roots, 0.1), vec![Some(1)]);
    }

    #[test]
    fn exact_tie_goes_to_lower_branch() {
        let branches = vec![
            TrackedBranch {
                points: vec![c(0.0, 0.0)],
                gains: vec![0.0],
            },
            TrackedBranch {
                points: vec![c(0.0, 0.0)],
                gains: vec![0.0],
            },
        ];
        let roots = [c(0.0, 1.0), c(0.0, -1.0)];
        assert_eq!(assign(&branches, &roots, 0.1), vec![Some(0), Some(1)]);
    }

    #[test]
    fn branches_start_at_poles() {
        // s(s + 2) + K
        let den = Polynomial::new(vec![1.0, 2.0, 0.0]);
        let num = Polynomial::constant(1.0);
        let poles = [c(-2.0, 0.0), c(0.0, 0.0)];
        let gains = gain_grid(1e-3, 1e3, 400).unwrap();
        let branches = trace_branches(&num, &den, &poles, &gains, 0.1).unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].points[0], poles[0]);
        assert_eq!(branches[1].points[0], poles[1]);
        for b in &branches {
            assert_eq!(b.points.len(), gains.len());
            // after breakaway at s = -1 both branches stay on the vertical line
            let end = b.points[b.points.len() - 1];
            assert!((end.re + 1.0).abs() < 1e-6);
        }
        // conjugate branches end in opposite half planes
        let a = branches[0].points.last().unwrap().im;
        let b = branches[1].points.last().unwrap().im;
        assert!(a * b < 0.0);
    }

    #[test]
    fn extra_branches_from_infinity() {
        // (s + 1) + K (s + 2)(s + 3)
        let den = Polynomial::new(vec![1.0, 1.0]);
        let num = Polynomial::new(vec![1.0, 5.0, 6.0]);
        let gains = gain_grid(1e-3, 1e3, 200).unwrap();
        let branches = trace_branches(&num, &den, &[c(-1.0, 0.0)], &gains, 0.1).unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].gains[0], 0.0);
        assert!(branches[1].gains[0] > 0.0);
        assert_eq!(branches[1].points.len(), gains.len() - 1);
    }
}
