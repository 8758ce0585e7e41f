//! Unions of open real intervals and polynomial sign analysis.

use std::fmt;

use lti_core::Polynomial;
use serde::{Deserialize, Serialize};

use crate::error::StabilityResult;

/// Roots closer than this (relative) are merged before sign testing.
const ROOT_MERGE_REL: f64 = 1e-9;

/// Open interval `(lower, upper)`; `None` is an infinite bound.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Interval {
    pub const ALL: Interval = Interval {
        lower: None,
        upper: None,
    };

    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lower.is_none_or(|l| x > l) && self.upper.is_none_or(|u| x < u)
    }

    fn is_empty(&self) -> bool {
        matches!((self.lower, self.upper), (Some(l), Some(u)) if l >= u)
    }

    fn intersect(&self, other: &Interval) -> Interval {
        let lower = match (self.lower, other.lower) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let upper = match (self.upper, other.upper) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Interval { lower, upper }
    }
}

/// Sorted, disjoint union of open intervals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalSet {
    pub intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            intervals: vec![Interval::ALL],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.intervals.iter().any(|i| i.contains(x))
    }

    pub fn intersect(&self, other: &IntervalSet) -> IntervalSet {
        let mut intervals = Vec::new();
        for a in &self.intervals {
            for b in &other.intervals {
                let c = a.intersect(b);
                if !c.is_empty() {
                    intervals.push(c);
                }
            }
        }
        intervals.sort_by(|a, b| {
            let la = a.lower.unwrap_or(f64::NEG_INFINITY);
            let lb = b.lower.unwrap_or(f64::NEG_INFINITY);
            la.total_cmp(&lb)
        });
        IntervalSet { intervals }
    }

    /// Human-readable form in terms of `var`, e.g. `0 < x < 9 or x > 12`.
    pub fn describe(&self, var: &str) -> String {
        if self.intervals.is_empty() {
            return "No stable region".to_string();
        }
        self.intervals
            .iter()
            .map(|i| match (i.lower, i.upper) {
                (None, None) => format!("all real {var}"),
                (Some(l), None) => format!("{var} > {}", fmt_bound(l)),
                (None, Some(u)) => format!("{var} < {}", fmt_bound(u)),
                (Some(l), Some(u)) => format!("{} < {var} < {}", fmt_bound(l), fmt_bound(u)),
            })
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe("x"))
    }
}

/// Up to six decimals, trailing zeros dropped.
fn fmt_bound(v: f64) -> String {
    let rounded = (v * 1e6).round() / 1e6 + 0.0;
    let s = format!("{rounded:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// The set where `p(x) > 0`, by sign analysis between its distinct real roots.
pub fn positive_set(p: &Polynomial) -> StabilityResult<IntervalSet> {
    if p.degree() == 0 {
        return Ok(if p.leading() > 0.0 {
            IntervalSet::all()
        } else {
            IntervalSet::empty()
        });
    }

    let mut roots = p.real_roots()?;
    roots.sort_by(f64::total_cmp);
    let mut breaks: Vec<f64> = Vec::with_capacity(roots.len());
    for r in roots {
        match breaks.last() {
            Some(last) if (r - last).abs() <= ROOT_MERGE_REL * r.abs().max(1.0) => {}
            _ => breaks.push(r),
        }
    }

    if breaks.is_empty() {
        let sample = p.eval(0.0);
        let sample = if sample == 0.0 { p.leading() } else { sample };
        return Ok(if sample > 0.0 {
            IntervalSet::all()
        } else {
            IntervalSet::empty()
        });
    }

    let mut intervals = Vec::new();
    let first = breaks[0];
    if p.eval(first - 1.0 - first.abs()) > 0.0 {
        intervals.push(Interval::new(None, Some(first)));
    }
    for w in breaks.windows(2) {
        if p.eval(0.5 * (w[0] + w[1])) > 0.0 {
            intervals.push(Interval::new(Some(w[0]), Some(w[1])));
        }
    }
    let last = breaks[breaks.len() - 1];
    if p.eval(last + 1.0 + last.abs()) > 0.0 {
        intervals.push(Interval::new(Some(last), None));
    }
    Ok(IntervalSet { intervals })
}
