//! Routh array construction.
//!
//! Entries are rational functions of at most one free variable. Each row
//! stores polynomial numerators plus one shared row denominator, so the true
//! entry `j` of row `i` is `entries[j] / denominator`. Purely numeric arrays
//! are the degree-0 special case of the same code path.
//!
//! From rows `a` (two above) and `b` (one above) the next row is
//!
//! ```text
//! c_j = (b_0 a_{j+1} - a_0 b_{j+1}) / b_0
//!     = (Fb_0 Fa_{j+1} - Fa_0 Fb_{j+1}) / (Da Fb_0)
//! ```
//!
//! and the pivot `Fb_0` is divided out of the numerators whenever the
//! division is exact, which keeps degrees from compounding.

use lti_core::Polynomial;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StabilityError, StabilityResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RouthOptions {
    /// Placeholder for a zero pivot, relative to the largest input coefficient
    pub epsilon: f64,
    /// Coefficients below this fraction of the operand scale are treated as zero
    pub zero_tolerance: f64,
}

impl Default for RouthOptions {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            zero_tolerance: 1e-10,
        }
    }
}

/// Recovery steps taken while building the array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouthNote {
    /// First entry of `row` was zero and replaced by a small positive placeholder.
    EpsilonSubstituted { row: usize },
    /// `row` vanished entirely and was replaced by the derivative of the
    /// auxiliary polynomial formed from the row above.
    ZeroRow { row: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouthRow {
    /// Power of `s` this row is labelled with
    pub power: usize,
    pub entries: Vec<Polynomial>,
    pub denominator: Polynomial,
}

impl RouthRow {
    pub fn first(&self) -> &Polynomial {
        &self.entries[0]
    }

    /// Value of entry `j` at `x` (the free variable; ignored for numeric rows).
    pub fn value(&self, j: usize, x: f64) -> f64 {
        self.entries[j].eval(x) / self.denominator.eval(x)
    }

    /// Polynomial with the same sign as the first entry wherever it is defined.
    pub fn first_sign_polynomial(&self) -> Polynomial {
        &self.entries[0] * &self.denominator
    }

    fn is_zero(&self) -> bool {
        self.entries.iter().all(Polynomial::is_zero)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouthArray {
    pub rows: Vec<RouthRow>,
    pub notes: Vec<RouthNote>,
}

impl RouthArray {
    /// Degree of the characteristic polynomial.
    pub fn degree(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn is_degenerate(&self) -> bool {
        !self.notes.is_empty()
    }

    /// First-column values at `x`.
    pub fn first_column(&self, x: f64) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(0, x)).collect()
    }

    /// Auxiliary polynomial (in `s`) formed from the row above `zero_row`, at `x`.
    pub fn auxiliary_polynomial(&self, zero_row: usize, x: f64) -> Option<Polynomial> {
        let above = self.rows.get(zero_row.checked_sub(1)?)?;
        let m = above.power;
        let mut coeffs = vec![0.0; m + 1];
        for (j, _) in above.entries.iter().enumerate() {
            if 2 * j <= m {
                coeffs[2 * j] = above.value(j, x);
            }
        }
        Some(Polynomial::new(coeffs))
    }
}

/// Build the Routh array for `c_0 s^n + c_1 s^(n-1) + ... + c_n`, each
/// coefficient a polynomial in the free variable.
///
/// # Errors
///
/// Returns `InvalidInput` when no coefficient is non-zero.
pub fn build_routh(coeffs: &[Polynomial], opts: &RouthOptions) -> StabilityResult<RouthArray> {
    let start = coeffs
        .iter()
        .position(|c| !c.is_zero())
        .ok_or_else(|| StabilityError::invalid("characteristic polynomial is identically zero"))?;
    let coeffs = &coeffs[start..];
    let degree = coeffs.len() - 1;
    let width = coeffs.len().div_ceil(2);

    let scale = coeffs.iter().map(Polynomial::max_abs).fold(0.0, f64::max);
    let epsilon = opts.epsilon * scale.max(1.0);

    let row_from = |offset: usize, power: usize| -> RouthRow {
        let mut entries: Vec<Polynomial> = coeffs.iter().skip(offset).step_by(2).cloned().collect();
        entries.resize(width, Polynomial::zero());
        RouthRow {
            power,
            entries,
            denominator: Polynomial::constant(1.0),
        }
    };

    let mut rows = vec![row_from(0, degree)];
    let mut notes = Vec::new();
    if degree == 0 {
        return Ok(RouthArray { rows, notes });
    }
    rows.push(row_from(1, degree - 1));
    settle_row(&mut rows, 1, epsilon, &mut notes);

    for i in 2..=degree {
        let a = &rows[i - 2];
        let b = &rows[i - 1];
        let pivot = b.first().clone();

        let mut entries = Vec::with_capacity(width);
        for j in 0..width {
            let a_next = a.entries.get(j + 1).cloned().unwrap_or_else(Polynomial::zero);
            let b_next = b.entries.get(j + 1).cloned().unwrap_or_else(Polynomial::zero);
            let g = &(&pivot * &a_next) - &(a.first() * &b_next);
            let op_scale = pivot.max_abs() * a_next.max_abs() + a.first().max_abs() * b_next.max_abs();
            entries.push(chop(&g, opts.zero_tolerance * op_scale));
        }

        let (entries, denominator) = match divide_all(&entries, &pivot, opts.zero_tolerance) {
            Some(reduced) => (reduced, a.denominator.clone()),
            None => (entries, &a.denominator * &pivot),
        };

        rows.push(normalize(RouthRow {
            power: degree - i,
            entries,
            denominator,
        }));
        settle_row(&mut rows, i, epsilon, &mut notes);
    }

    debug!(degree, notes = notes.len(), "routh array built");
    Ok(RouthArray { rows, notes })
}

/// Apply zero-row and zero-pivot recovery to `rows[i]`.
fn settle_row(rows: &mut [RouthRow], i: usize, epsilon: f64, notes: &mut Vec<RouthNote>) {
    if rows[i].is_zero() {
        let above = &rows[i - 1];
        let m = above.power;
        let entries = above
            .entries
            .iter()
            .enumerate()
            .map(|(j, e)| {
                if 2 * j < m {
                    e.scale((m - 2 * j) as f64)
                } else {
                    Polynomial::zero()
                }
            })
            .collect();
        let denominator = above.denominator.clone();
        rows[i].entries = entries;
        rows[i].denominator = denominator;
        notes.push(RouthNote::ZeroRow { row: i });
        debug!(row = i, "zero row replaced by auxiliary polynomial derivative");
    }

    if rows[i].first().is_zero() {
        let placeholder = rows[i].denominator.scale(epsilon);
        rows[i].entries[0] = placeholder;
        notes.push(RouthNote::EpsilonSubstituted { row: i });
        debug!(row = i, epsilon, "zero pivot replaced by epsilon");
    }
}

/// Divide every entry by `pivot` when all divisions are exact.
fn divide_all(entries: &[Polynomial], pivot: &Polynomial, tol: f64) -> Option<Vec<Polynomial>> {
    if pivot.degree() == 0 {
        let p = pivot.leading();
        return Some(entries.iter().map(|e| e.scale(1.0 / p)).collect());
    }
    entries
        .iter()
        .map(|e| {
            let (q, r) = e.div_rem(pivot).ok()?;
            if r.max_abs() <= tol * e.max_abs().max(1.0) * 1e2 {
                Some(q)
            } else {
                None
            }
        })
        .collect()
}

/// Fold a constant row denominator into the entries.
fn normalize(mut row: RouthRow) -> RouthRow {
    if row.denominator.degree() == 0 {
        let d = row.denominator.leading();
        if d != 1.0 {
            row.entries = row.entries.iter().map(|e| e.scale(1.0 / d)).collect();
            row.denominator = Polynomial::constant(1.0);
        }
    }
    row
}

/// Zero out coefficients at or below `tol`.
fn chop(p: &Polynomial, tol: f64) -> Polynomial {
    Polynomial::new(
        p.coeffs()
            .iter()
            .map(|c| if c.abs() <= tol { 0.0 } else { *c })
            .collect::<Vec<_>>(),
    )
}
