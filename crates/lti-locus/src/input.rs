//! Validation of the open-loop pole/zero sets and pole/zero cancellation.

use lti_core::polynomial::sort_roots;
use lti_core::{Complex64, ComplexPoint, LtiError, Polynomial};
use tracing::debug;

use crate::error::{LocusError, LocusResult};

/// Open-loop data after validation and cancellation.
#[derive(Clone, Debug, PartialEq)]
pub struct LocusInput {
    /// Remaining zeros, sorted
    pub zeros: Vec<Complex64>,
    /// Remaining poles, sorted; branch `i` starts at `poles[i]`
    pub poles: Vec<Complex64>,
    /// Locations where a pole and a zero coincided and were removed
    pub cancelled: Vec<Complex64>,
    /// Monic `prod(s - z)`
    pub num: Polynomial,
    /// Monic `prod(s - p)`
    pub den: Polynomial,
}

impl LocusInput {
    /// Number of locus branches.
    pub fn branch_count(&self) -> usize {
        self.poles.len().max(self.zeros.len())
    }
}

fn invalid(what: impl Into<String>) -> LocusError {
    LocusError::InvalidInput { what: what.into() }
}

fn checked_polynomial(points: &[Complex64], what: &str) -> LocusResult<Polynomial> {
    Polynomial::from_roots(points).map_err(|e| match e {
        LtiError::InvalidInput { what: detail } => invalid(format!("{what}: {detail}")),
        other => other.into(),
    })
}

/// Validate the pole and zero sets and cancel coincident pairs.
///
/// A zero and a pole closer than `cancel_tolerance * max(1, |z|)` are removed
/// together; each zero cancels at most one pole.
///
/// # Errors
///
/// `InvalidInput` when no poles are supplied, every pole is cancelled, a value
/// is not finite, or complex values do not come in conjugate pairs.
pub fn prepare_input(
    zeros: &[ComplexPoint],
    poles: &[ComplexPoint],
    cancel_tolerance: f64,
) -> LocusResult<LocusInput> {
    if poles.is_empty() {
        return Err(invalid("at least one open-loop pole is required"));
    }
    if zeros.iter().chain(poles).any(|p| !p.is_finite()) {
        return Err(invalid("poles and zeros must be finite"));
    }

    let zeros: Vec<Complex64> = zeros.iter().map(|p| Complex64::from(*p)).collect();
    let poles: Vec<Complex64> = poles.iter().map(|p| Complex64::from(*p)).collect();
    checked_polynomial(&zeros, "zeros")?;
    checked_polynomial(&poles, "poles")?;

    let mut remaining_poles = poles;
    let mut remaining_zeros = Vec::with_capacity(zeros.len());
    let mut cancelled = Vec::new();
    for z in zeros {
        let tol = cancel_tolerance * z.norm().max(1.0);
        match remaining_poles.iter().position(|p| (p - z).norm() <= tol) {
            Some(i) => {
                remaining_poles.remove(i);
                cancelled.push(z);
            }
            None => remaining_zeros.push(z),
        }
    }
    if remaining_poles.is_empty() {
        return Err(invalid(
            "every pole is cancelled by a coincident zero; no locus remains",
        ));
    }
    if !cancelled.is_empty() {
        debug!(pairs = cancelled.len(), "cancelled coincident pole/zero pairs");
    }

    sort_roots(&mut remaining_poles);
    sort_roots(&mut remaining_zeros);
    sort_roots(&mut cancelled);
    let num = checked_polynomial(&remaining_zeros, "zeros")?;
    let den = checked_polynomial(&remaining_poles, "poles")?;

    Ok(LocusInput {
        zeros: remaining_zeros,
        poles: remaining_poles,
        cancelled,
        num,
        den,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(f64, f64)]) -> Vec<ComplexPoint> {
        v.iter().map(|(r, i)| ComplexPoint::new(*r, *i)).collect()
    }

    #[test]
    fn empty_poles_rejected() {
        let err = prepare_input(&pts(&[(-1.0, 0.0)]), &[], 1e-9).unwrap_err();
        assert!(matches!(err, LocusError::InvalidInput { .. }));
    }

    #[test]
    fn unpaired_complex_pole_rejected() {
        let err = prepare_input(&[], &pts(&[(-1.0, 2.0)]), 1e-9).unwrap_err();
        assert!(matches!(err, LocusError::InvalidInput { .. }));
    }

    #[test]
    fn coincident_pair_is_cancelled() {
        let input = prepare_input(
            &pts(&[(-2.0, 0.0)]),
            &pts(&[(0.0, 0.0), (-2.0, 0.0), (-3.0, 0.0)]),
            1e-9,
        )
        .unwrap();
        assert_eq!(input.cancelled, vec![Complex64::new(-2.0, 0.0)]);
        assert!(input.zeros.is_empty());
        assert_eq!(input.poles.len(), 2);
        assert_eq!(input.den.coeffs(), &[1.0, 3.0, 0.0]);
        assert_eq!(input.branch_count(), 2);
    }

    #[test]
    fn fully_cancelled_system_rejected() {
        let err = prepare_input(&pts(&[(-1.0, 0.0)]), &pts(&[(-1.0, 0.0)]), 1e-9).unwrap_err();
        assert!(matches!(err, LocusError::InvalidInput { .. }));
    }

    #[test]
    fn poles_are_sorted() {
        let input = prepare_input(
            &[],
            &pts(&[(0.0, 0.0), (-1.0, 1.0), (-3.0, 0.0), (-1.0, -1.0)]),
            1e-9,
        )
        .unwrap();
        let re: Vec<f64> = input.poles.iter().map(|p| p.re).collect();
        assert_eq!(re, vec![-3.0, -1.0, -1.0, 0.0]);
        assert!(input.poles[1].im < input.poles[2].im);
    }
}
