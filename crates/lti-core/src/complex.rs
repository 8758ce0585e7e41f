//! Serializable complex point used at every API boundary.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A point in the s-plane, serialized as `{ "real": .., "imag": .. }`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexPoint {
    pub real: f64,
    pub imag: f64,
}

impl ComplexPoint {
    pub fn new(real: f64, imag: f64) -> Self {
        Self { real, imag }
    }

    pub fn is_finite(&self) -> bool {
        self.real.is_finite() && self.imag.is_finite()
    }
}

impl From<Complex64> for ComplexPoint {
    fn from(z: Complex64) -> Self {
        Self {
            real: z.re,
            imag: z.im,
        }
    }
}

impl From<ComplexPoint> for Complex64 {
    fn from(p: ComplexPoint) -> Self {
        Complex64::new(p.real, p.imag)
    }
}

/// Human-readable form, e.g. `-1.0000 + 1.4142j`.
pub fn format_complex(z: Complex64) -> String {
    if z.im == 0.0 {
        format!("{:.4}", z.re)
    } else if z.im > 0.0 {
        format!("{:.4} + {:.4}j", z.re, z.im)
    } else {
        format!("{:.4} - {:.4}j", z.re, -z.im)
    }
}
