//! Stability verdicts from the Routh array.

use lti_core::{ComplexPoint, Polynomial};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StabilityError, StabilityResult};
use crate::expr::parse_coefficients;
use crate::interval::{IntervalSet, positive_set};
use crate::routh::{RouthNote, RouthOptions, build_routh};

/// Auxiliary-polynomial roots with real parts below this are on the axis.
const AXIS_TOL: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouthVerdict {
    Stable,
    Marginal,
    Unstable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericRouth {
    pub verdict: RouthVerdict,
    pub first_column: Vec<f64>,
    pub sign_changes: usize,
    /// Right-half-plane roots, equal to the first-column sign changes
    pub rhp_roots: usize,
    pub notes: Vec<RouthNote>,
    /// Roots of the auxiliary polynomials lying on the imaginary axis
    pub imaginary_axis_roots: Vec<ComplexPoint>,
    /// True when an epsilon placeholder was used
    pub approximate: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolicRouth {
    pub variable: String,
    /// Polynomials whose positivity is required, one per Routh row
    pub conditions: Vec<Vec<f64>>,
    pub stable_set: IntervalSet,
    pub notes: Vec<RouthNote>,
}

/// Response of the stability-range analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StabilityRange {
    pub message: String,
    pub stability_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervals: Option<IntervalSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericRouth>,
}

fn count_sign_changes(values: &[f64]) -> usize {
    values
        .iter()
        .filter(|v| **v != 0.0)
        .collect::<Vec<_>>()
        .windows(2)
        .filter(|w| w[0].signum() != w[1].signum())
        .count()
}

/// Numeric Routh–Hurwitz test.
///
/// Unstable when the first column changes sign (the count equals the number
/// of right-half-plane roots). Without sign changes a zero row or zero pivot
/// means roots on the imaginary axis: marginal, or unstable when the
/// auxiliary polynomial has a repeated imaginary-axis root.
pub fn routh_numeric(coeffs: &[f64], opts: &RouthOptions) -> StabilityResult<NumericRouth> {
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(StabilityError::invalid("coefficients must be finite"));
    }
    let polys: Vec<Polynomial> = coeffs.iter().map(|c| Polynomial::constant(*c)).collect();
    let array = build_routh(&polys, opts)?;
    let first_column = array.first_column(0.0);
    let sign_changes = count_sign_changes(&first_column);

    let mut axis_roots = Vec::new();
    let mut repeated = false;
    for note in &array.notes {
        if let RouthNote::ZeroRow { row } = note
            && let Some(aux) = array.auxiliary_polynomial(*row, 0.0)
        {
            let roots: Vec<_> = aux
                .roots()?
                .into_iter()
                .filter(|r| r.re.abs() <= AXIS_TOL * r.norm().max(1.0))
                .collect();
            for (i, a) in roots.iter().enumerate() {
                if roots[i + 1..].iter().any(|b| (a - b).norm() <= 1e-4) {
                    repeated = true;
                }
            }
            axis_roots.extend(roots.into_iter().map(ComplexPoint::from));
        }
    }

    let verdict = if sign_changes > 0 || repeated {
        RouthVerdict::Unstable
    } else if array.is_degenerate() {
        RouthVerdict::Marginal
    } else {
        RouthVerdict::Stable
    };

    Ok(NumericRouth {
        verdict,
        first_column,
        sign_changes,
        rhp_roots: sign_changes,
        approximate: array
            .notes
            .iter()
            .any(|n| matches!(n, RouthNote::EpsilonSubstituted { .. })),
        notes: array.notes,
        imaginary_axis_roots: axis_roots,
    })
}

/// Values of the free variable for which every first-column entry is positive.
///
/// A zero row or zero pivot that occurs identically in the variable means
/// the system is never strictly stable, so the set is empty in that case.
pub fn routh_symbolic(
    coeffs: &[Polynomial],
    variable: &str,
    opts: &RouthOptions,
) -> StabilityResult<SymbolicRouth> {
    let array = build_routh(coeffs, opts)?;
    let conditions: Vec<Polynomial> = array
        .rows
        .iter()
        .map(|r| r.first_sign_polynomial())
        .collect();

    let stable_set = if array.is_degenerate() {
        IntervalSet::empty()
    } else {
        let mut set = IntervalSet::all();
        for c in &conditions {
            set = set.intersect(&positive_set(c)?);
            if set.is_empty() {
                break;
            }
        }
        set
    };
    debug!(variable, intervals = stable_set.intervals.len(), "symbolic routh solved");

    Ok(SymbolicRouth {
        variable: variable.to_string(),
        conditions: conditions.iter().map(|c| c.coeffs().to_vec()).collect(),
        stable_set,
        notes: array.notes,
    })
}

/// Stability range over a single free variable appearing in the coefficients.
///
/// Without a free variable the numeric verdict is reported in the message and
/// the range is `"N/A"`.
///
/// # Errors
///
/// `InvalidInput` for unparsable coefficients or fewer than two of them;
/// `UnsupportedSymbolicExpression` for more than one free variable.
pub fn analyze_stability_range<S: AsRef<str>>(
    coeffs: &[S],
    opts: &RouthOptions,
) -> StabilityResult<StabilityRange> {
    let parsed = parse_coefficients(coeffs)?;
    if parsed.coeffs.len() < 2 {
        return Err(StabilityError::invalid(
            "characteristic equation must have at least 2 coefficients",
        ));
    }

    let variable = match (&parsed.variable, parsed.is_symbolic()) {
        (Some(v), true) => v.clone(),
        _ => {
            let values: Vec<f64> = parsed.coeffs.iter().map(|c| c.eval(0.0)).collect();
            let numeric = routh_numeric(&values, opts)?;
            let message = match numeric.verdict {
                RouthVerdict::Stable => "No free variable; the system is stable.".to_string(),
                RouthVerdict::Marginal => format!(
                    "No free variable; the system is marginally stable ({} imaginary-axis roots).",
                    numeric.imaginary_axis_roots.len()
                ),
                RouthVerdict::Unstable => format!(
                    "No free variable; the system is unstable: the first column {:?} has {} sign changes, one per right-half-plane root.",
                    numeric.first_column, numeric.sign_changes
                ),
            };
            return Ok(StabilityRange {
                message,
                stability_range: "N/A".to_string(),
                variable: None,
                intervals: None,
                numeric: Some(numeric),
            });
        }
    };

    let symbolic = routh_symbolic(&parsed.coeffs, &variable, opts)?;
    let stability_range = symbolic.stable_set.describe(&variable);
    let message = if symbolic.notes.is_empty() {
        if symbolic.stable_set.is_empty() {
            format!("No stable region found for {variable}. System is unstable for all {variable}.")
        } else {
            "Symbolic stability analysis successful".to_string()
        }
    } else {
        let detail = symbolic
            .notes
            .iter()
            .map(|n| match n {
                RouthNote::EpsilonSubstituted { row } => {
                    format!("zero pivot in row {row} replaced by epsilon")
                }
                RouthNote::ZeroRow { row } => {
                    format!("row {row} vanished; auxiliary polynomial used")
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        format!(
            "Boundary case for all {variable} ({detail}): roots lie on or mirror across the imaginary axis, so no strictly stable region exists."
        )
    };

    Ok(StabilityRange {
        message,
        stability_range,
        variable: Some(variable),
        intervals: Some(symbolic.stable_set),
        numeric: None,
    })
}
