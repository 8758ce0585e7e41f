//! Open-loop response in factored form `k·Π(s − z) / Π(s − p)`.

use lti_core::{Complex64, LtiError, Polynomial, TransferFunction};

use crate::error::{FreqError, FreqResult, invalid};

/// Magnitudes are clamped into `[MAG_FLOOR, MAG_CEIL]` before conversion to dB.
pub const MAG_FLOOR: f64 = 1e-10;
pub const MAG_CEIL: f64 = 1e20;

#[derive(Clone, Debug, PartialEq)]
pub struct FactoredResponse {
    pub gain: f64,
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    /// Poles and zeros with modulus at or below this sit at the origin
    pub origin_tolerance: f64,
}

impl FactoredResponse {
    /// # Errors
    ///
    /// `InvalidInput` for non-finite values or complex values without their conjugate.
    pub fn from_zpk(zeros: &[Complex64], poles: &[Complex64], gain: f64) -> FreqResult<Self> {
        if !gain.is_finite() {
            return Err(invalid("gain must be finite"));
        }
        for (what, set) in [("zeros", zeros), ("poles", poles)] {
            Polynomial::from_roots(set).map_err(|e| match e {
                LtiError::InvalidInput { what: detail } => invalid(format!("{what}: {detail}")),
                other => FreqError::from(other),
            })?;
        }
        Ok(Self {
            gain,
            zeros: zeros.to_vec(),
            poles: poles.to_vec(),
            origin_tolerance: 1e-9,
        })
    }

    /// Factor a transfer function through its roots.
    pub fn from_tf(tf: &TransferFunction) -> FreqResult<Self> {
        let num = tf.numerator();
        if num.is_zero() {
            return Err(invalid("numerator is identically zero"));
        }
        let gain = num.leading() / tf.denominator().leading();
        Self::from_zpk(&tf.zeros()?, &tf.poles()?, gain)
    }

    fn at_origin(&self, z: &Complex64) -> bool {
        z.norm() <= self.origin_tolerance
    }

    /// Net free integrators: origin poles minus origin zeros.
    pub fn integrators(&self) -> i32 {
        let p = self.poles.iter().filter(|p| self.at_origin(p)).count() as i32;
        let z = self.zeros.iter().filter(|z| self.at_origin(z)).count() as i32;
        p - z
    }

    /// Gain of the response with origin factors removed, `k·Π(−z) / Π(−p)`
    /// over the non-origin zeros and poles.
    pub fn low_frequency_gain(&self) -> f64 {
        let num: Complex64 = self
            .zeros
            .iter()
            .filter(|z| !self.at_origin(z))
            .map(|z| -z)
            .product();
        let den: Complex64 = self
            .poles
            .iter()
            .filter(|p| !self.at_origin(p))
            .map(|p| -p)
            .product();
        (num / den).re * self.gain
    }

    /// `H(0)`; `None` when a pole at the origin makes it unbounded.
    pub fn dc_gain(&self) -> Option<f64> {
        match self.integrators() {
            n if n > 0 => None,
            n if n < 0 => Some(0.0),
            _ => Some(self.low_frequency_gain()).filter(|g| g.is_finite()),
        }
    }

    pub fn eval(&self, omega: f64) -> Complex64 {
        let s = Complex64::new(0.0, omega);
        let num: Complex64 = self.zeros.iter().map(|z| s - z).product();
        let den: Complex64 = self.poles.iter().map(|p| s - p).product();
        num / den * self.gain
    }

    /// `|H(jω)|` clamped into the representable dB range.
    pub fn magnitude(&self, omega: f64) -> f64 {
        let m = self.eval(omega).norm();
        if m.is_nan() { MAG_CEIL } else { m.clamp(MAG_FLOOR, MAG_CEIL) }
    }

    pub fn magnitude_db(&self, omega: f64) -> f64 {
        20.0 * self.magnitude(omega).log10()
    }

    /// Phase in degrees as the sum of factor angles. Continuous in `ω`
    /// except where a factor passes through zero or a right-half-plane
    /// factor crosses its branch cut.
    pub fn phase_deg(&self, omega: f64) -> f64 {
        let s = Complex64::new(0.0, omega);
        let zeros: f64 = self.zeros.iter().map(|z| (s - z).arg()).sum();
        let poles: f64 = self.poles.iter().map(|p| (s - p).arg()).sum();
        let sign = if self.gain < 0.0 { -180.0 } else { 0.0 };
        sign + (zeros - poles).to_degrees()
    }

    /// Distinct non-zero `|p|`, `|z|`, sorted.
    pub fn corner_frequencies(&self) -> Vec<f64> {
        let mut corners: Vec<f64> = self
            .zeros
            .iter()
            .chain(&self.poles)
            .filter(|r| !self.at_origin(r))
            .map(|r| r.norm())
            .collect();
        corners.sort_by(f64::total_cmp);
        corners.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * b.max(1.0));
        corners
    }

    /// Poles on the imaginary axis with `Im >= 0`, as frequencies.
    pub fn axis_pole_frequencies(&self) -> Vec<f64> {
        let mut out: Vec<f64> = self
            .poles
            .iter()
            .filter(|p| p.re.abs() <= self.origin_tolerance * p.norm().max(1.0) && p.im >= 0.0)
            .map(|p| p.im)
            .collect();
        out.sort_by(f64::total_cmp);
        out.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * b.max(1.0));
        out
    }
}
