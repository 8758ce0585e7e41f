//! Validated single-input single-output rational transfer functions.

use num_complex::Complex64;

use crate::error::{LtiError, LtiResult};
use crate::numeric::ensure_all_finite;
use crate::polynomial::Polynomial;

/// `G(s) = num(s) / den(s)`, immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferFunction {
    num: Polynomial,
    den: Polynomial,
}

impl TransferFunction {
    /// Construct from raw coefficient sequences, highest degree first.
    ///
    /// # Errors
    ///
    /// - `InvalidSystem` if the denominator is empty or all zero
    /// - `InvalidInput` if the numerator is empty
    /// - `NonFinite` if any coefficient is NaN or infinite
    pub fn new(num: &[f64], den: &[f64]) -> LtiResult<Self> {
        if num.is_empty() {
            return Err(LtiError::invalid_input("numerator must not be empty"));
        }
        ensure_all_finite(num, "numerator coefficient")?;
        ensure_all_finite(den, "denominator coefficient")?;
        Self::from_polynomials(Polynomial::new(num.to_vec()), Polynomial::new(den.to_vec()))
    }

    pub fn from_polynomials(num: Polynomial, den: Polynomial) -> LtiResult<Self> {
        if den.is_zero() {
            return Err(LtiError::InvalidSystem {
                what: "denominator is empty or identically zero",
            });
        }
        Ok(Self { num, den })
    }

    /// Build `k * prod(s - z) / prod(s - p)`.
    pub fn from_zpk(zeros: &[Complex64], poles: &[Complex64], gain: f64) -> LtiResult<Self> {
        let num = Polynomial::from_roots(zeros)?.scale(gain);
        let den = Polynomial::from_roots(poles)?;
        Self::from_polynomials(num, den)
    }

    pub fn numerator(&self) -> &Polynomial {
        &self.num
    }

    pub fn denominator(&self) -> &Polynomial {
        &self.den
    }

    pub fn poles(&self) -> LtiResult<Vec<Complex64>> {
        self.den.roots()
    }

    pub fn zeros(&self) -> LtiResult<Vec<Complex64>> {
        self.num.roots()
    }

    /// Denominator degree.
    pub fn order(&self) -> usize {
        self.den.degree()
    }

    pub fn is_proper(&self) -> bool {
        self.num.is_zero() || self.num.degree() <= self.den.degree()
    }

    pub fn eval(&self, s: Complex64) -> Complex64 {
        self.num.eval_complex(s) / self.den.eval_complex(s)
    }

    /// `G(jω)`.
    pub fn freq_response(&self, omega: f64) -> Complex64 {
        self.eval(Complex64::new(0.0, omega))
    }

    pub fn series(&self, other: &TransferFunction) -> TransferFunction {
        Self {
            num: &self.num * &other.num,
            den: &self.den * &other.den,
        }
    }

    pub fn scale(&self, k: f64) -> TransferFunction {
        Self {
            num: self.num.scale(k),
            den: self.den.clone(),
        }
    }

    /// Closed loop `G / (1 + G)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSystem` when `den + num` vanishes identically.
    pub fn unity_feedback(&self) -> LtiResult<TransferFunction> {
        Self::from_polynomials(self.num.clone(), &self.den + &self.num)
    }

    /// Net number of free integrators (origin poles minus origin zeros, floored at 0).
    pub fn system_type(&self) -> usize {
        self.den
            .trailing_zeros()
            .saturating_sub(self.num.trailing_zeros())
    }

    /// `lim s->0 G(s)`; `None` when a pole at the origin makes it unbounded.
    pub fn dc_gain(&self) -> Option<f64> {
        if self.num.is_zero() {
            return Some(0.0);
        }
        let common = self.num.trailing_zeros().min(self.den.trailing_zeros());
        let num = self.num.shift_down(common);
        let den = self.den.shift_down(common);
        let d0 = den.coeff_of_power(0);
        if d0 == 0.0 {
            None
        } else {
            Some(num.coeff_of_power(0) / d0)
        }
    }

    /// Velocity error constant `lim s->0 s*G(s)`; `None` means infinite.
    pub fn velocity_constant(&self) -> Option<f64> {
        let shifted = Self {
            num: &self.num * &Polynomial::s(),
            den: self.den.clone(),
        };
        shifted.dc_gain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_denominator() {
        assert!(matches!(
            TransferFunction::new(&[1.0], &[0.0, 0.0]),
            Err(LtiError::InvalidSystem { .. })
        ));
        assert!(matches!(
            TransferFunction::new(&[1.0], &[]),
            Err(LtiError::InvalidSystem { .. })
        ));
        assert!(matches!(
            TransferFunction::new(&[], &[1.0, 1.0]),
            Err(LtiError::InvalidInput { .. })
        ));
        assert!(matches!(
            TransferFunction::new(&[f64::NAN], &[1.0, 1.0]),
            Err(LtiError::NonFinite { .. })
        ));
    }

    #[test]
    fn leading_zeros_are_trimmed() {
        let tf = TransferFunction::new(&[1.0], &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(tf.order(), 1);
    }

    #[test]
    fn gains_and_type() {
        let tf = TransferFunction::new(&[10.0], &[1.0, 3.0, 2.0]).unwrap();
        assert_eq!(tf.dc_gain(), Some(5.0));
        assert_eq!(tf.system_type(), 0);
        assert_eq!(tf.velocity_constant(), Some(0.0));

        let tf = TransferFunction::new(&[10.0], &[1.0, 3.0, 2.0, 0.0]).unwrap();
        assert_eq!(tf.dc_gain(), None);
        assert_eq!(tf.system_type(), 1);
        assert_eq!(tf.velocity_constant(), Some(5.0));

        let tf = TransferFunction::new(&[1.0], &[1.0, 0.0, 0.0]).unwrap();
        assert_eq!(tf.velocity_constant(), None);
    }

    #[test]
    fn feedback_and_series() {
        let g = TransferFunction::new(&[2.0], &[1.0, 1.0]).unwrap();
        let cl = g.unity_feedback().unwrap();
        assert_eq!(cl.denominator().coeffs(), &[1.0, 3.0]);
        assert_eq!(cl.dc_gain(), Some(2.0 / 3.0));

        let h = g.series(&g);
        assert_eq!(h.denominator().coeffs(), &[1.0, 2.0, 1.0]);
        assert_eq!(h.numerator().coeffs(), &[4.0]);
    }

    #[test]
    fn zpk_matches_coefficients() {
        let tf = TransferFunction::from_zpk(
            &[Complex64::new(-3.0, 0.0)],
            &[Complex64::new(-1.0, 0.0), Complex64::new(-2.0, 0.0)],
            2.0,
        )
        .unwrap();
        assert_eq!(tf.numerator().coeffs(), &[2.0, 6.0]);
        assert_eq!(tf.denominator().coeffs(), &[1.0, 3.0, 2.0]);
        let h = tf.freq_response(0.0);
        assert!((h.re - 3.0).abs() < 1e-12);
    }
}
