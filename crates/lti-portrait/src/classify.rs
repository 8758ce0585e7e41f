//! Equilibrium classification from the companion-matrix eigenvalues.
//!
//! The eigenvalues of a companion matrix are the denominator roots, so the
//! polished roots from `lti-core` are used directly. Higher-order systems are
//! classified by their two dominant (largest real part) eigenvalues, while
//! stability is judged over all of them.

use std::fmt;

use lti_core::{Complex64, ComplexPoint};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquilibriumType {
    StableNode,
    UnstableNode,
    Saddle,
    StableFocus,
    UnstableFocus,
    Center,
}

impl fmt::Display for EquilibriumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StableNode => "stable node",
            Self::UnstableNode => "unstable node",
            Self::Saddle => "saddle",
            Self::StableFocus => "stable focus",
            Self::UnstableFocus => "unstable focus",
            Self::Center => "center",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumAnalysis {
    pub point: [f64; 2],
    #[serde(rename = "type")]
    pub kind: EquilibriumType,
    /// A dominant eigenvalue sits at zero; the tag is the nearest node type
    pub degenerate: bool,
    /// Eigenvalues, dominant first
    pub eigenvalues: Vec<ComplexPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stability {
    Stable,
    Marginal,
    Unstable,
}

/// Classify the origin of `x' = A x` given the eigenvalues of `A`.
///
/// Real and imaginary parts within `tol·max(1, |λ|)` of zero count as zero.
/// Returns `None` for an empty eigenvalue set.
pub fn classify_equilibrium(eigenvalues: &[Complex64], tol: f64) -> Option<EquilibriumAnalysis> {
    let near_zero = |v: f64, l: &Complex64| v.abs() <= tol * l.norm().max(1.0);

    let mut sorted = eigenvalues.to_vec();
    sorted.sort_by(|a, b| b.re.total_cmp(&a.re).then(b.im.total_cmp(&a.im)));
    let p1 = *sorted.first()?;

    let mut stability = Stability::Stable;
    for (i, l) in sorted.iter().enumerate() {
        if near_zero(l.re, l) {
            let repeated = sorted
                .iter()
                .enumerate()
                .any(|(j, m)| j != i && near_zero(m.re, m) && (l - m).norm() <= 1e-4);
            if repeated {
                stability = Stability::Unstable;
                break;
            }
            stability = Stability::Marginal;
        } else if l.re > 0.0 {
            stability = Stability::Unstable;
            break;
        }
    }

    let complex = !near_zero(p1.im, &p1);
    let (kind, degenerate) = if complex {
        let kind = match stability {
            Stability::Stable => EquilibriumType::StableFocus,
            Stability::Unstable => EquilibriumType::UnstableFocus,
            Stability::Marginal => EquilibriumType::Center,
        };
        (kind, false)
    } else {
        let p1_zero = near_zero(p1.re, &p1);
        let p2 = sorted.get(1).copied();
        let p2_zero = p2.is_some_and(|p| near_zero(p.re, &p));
        let kind = match stability {
            Stability::Stable | Stability::Marginal => EquilibriumType::StableNode,
            Stability::Unstable => match p2 {
                Some(p2) if !p1_zero && p1.re > 0.0 && !p2_zero && p2.re < 0.0 => {
                    EquilibriumType::Saddle
                }
                _ => EquilibriumType::UnstableNode,
            },
        };
        (kind, p1_zero || p2_zero)
    };

    Some(EquilibriumAnalysis {
        point: [0.0, 0.0],
        kind,
        degenerate,
        eigenvalues: sorted.into_iter().map(ComplexPoint::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn kind(eigs: &[Complex64]) -> (EquilibriumType, bool) {
        let a = classify_equilibrium(eigs, 1e-8).unwrap();
        (a.kind, a.degenerate)
    }

    #[test]
    fn six_classes() {
        use EquilibriumType::*;
        assert_eq!(kind(&[c(-1.0, 0.0), c(-2.0, 0.0)]), (StableNode, false));
        assert_eq!(kind(&[c(1.0, 0.0), c(2.0, 0.0)]), (UnstableNode, false));
        assert_eq!(kind(&[c(1.0, 0.0), c(-1.0, 0.0)]), (Saddle, false));
        assert_eq!(kind(&[c(-0.5, 0.8), c(-0.5, -0.8)]), (StableFocus, false));
        assert_eq!(kind(&[c(0.5, 0.8), c(0.5, -0.8)]), (UnstableFocus, false));
        assert_eq!(kind(&[c(0.0, 1.0), c(0.0, -1.0)]), (Center, false));
    }

    #[test]
    fn zero_eigenvalue_is_degenerate_node() {
        use EquilibriumType::*;
        assert_eq!(kind(&[c(0.0, 0.0), c(-1.0, 0.0)]), (StableNode, true));
        assert_eq!(kind(&[c(0.0, 0.0), c(1.0, 0.0)]), (UnstableNode, true));
        // double integrator drifts
        assert_eq!(kind(&[c(0.0, 0.0), c(0.0, 0.0)]), (UnstableNode, true));
    }

    #[test]
    fn dominant_pair_decides_higher_order() {
        // slow focus plus a fast real pole
        let a = classify_equilibrium(&[c(-10.0, 0.0), c(-0.1, 2.0), c(-0.1, -2.0)], 1e-8).unwrap();
        assert_eq!(a.kind, EquilibriumType::StableFocus);
        assert_eq!(a.eigenvalues[0].real, -0.1);
        assert_eq!(a.eigenvalues[2].real, -10.0);
    }

    #[test]
    fn first_order_and_empty() {
        assert_eq!(kind(&[c(-3.0, 0.0)]), (EquilibriumType::StableNode, false));
        assert_eq!(kind(&[c(3.0, 0.0)]), (EquilibriumType::UnstableNode, false));
        assert!(classify_equilibrium(&[], 1e-8).is_none());
    }

    #[test]
    fn tags_serialize_snake_case() {
        let a = classify_equilibrium(&[c(-1.0, 1.0), c(-1.0, -1.0)], 1e-8).unwrap();
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["type"], "stable_focus");
        assert_eq!(v["point"], serde_json::json!([0.0, 0.0]));
        assert_eq!(EquilibriumType::Saddle.to_string(), "saddle");
    }
}
