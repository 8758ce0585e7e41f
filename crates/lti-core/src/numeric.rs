use crate::LtiError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, LtiError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LtiError::NonFinite { what, value: v })
    }
}

/// Check every entry of a coefficient slice.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), LtiError> {
    for &v in values {
        ensure_finite(v, what)?;
    }
    Ok(())
}

/// Wrap an angle in degrees into (-180, 180].
pub fn wrap_degrees(deg: Real) -> Real {
    let mut w = deg % 360.0;
    if w > 180.0 {
        w -= 360.0;
    } else if w <= -180.0 {
        w += 360.0;
    }
    w
}

/// Remove 360 degree jumps from a phase sequence.
pub fn unwrap_degrees(phase: &mut [Real]) {
    for i in 1..phase.len() {
        let mut d = phase[i] - phase[i - 1];
        while d > 180.0 {
            phase[i] -= 360.0;
            d -= 360.0;
        }
        while d < -180.0 {
            phase[i] += 360.0;
            d += 360.0;
        }
    }
}
