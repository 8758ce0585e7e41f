//! Real-coefficient polynomials in one variable.
//!
//! Coefficients are stored highest degree first, matching the way transfer
//! functions are written (`[1, 3, 2]` is `s^2 + 3s + 2`). Leading zeros are
//! trimmed on construction so the degree is always the length minus one.

use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::DMatrix;
use nalgebra::linalg::Schur;
use num_complex::Complex64;

use crate::error::{LtiError, LtiResult};

/// Iteration cap handed to the Schur decomposition.
const SCHUR_MAX_ITER: usize = 10_000;

/// Newton polishing passes applied to each eigenvalue.
const POLISH_STEPS: usize = 4;

/// Imaginary parts below this fraction of the root magnitude are treated as zero.
const IMAG_SNAP_REL: f64 = 1e-7;

#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Build from coefficients, highest degree first.
    ///
    /// An empty slice, or one holding only zeros, yields the zero polynomial.
    pub fn new(coeffs: impl Into<Vec<f64>>) -> Self {
        let mut coeffs: Vec<f64> = coeffs.into();
        let first = coeffs.iter().position(|c| *c != 0.0);
        match first {
            Some(i) => {
                coeffs.drain(..i);
            }
            None => coeffs = vec![0.0],
        }
        Self { coeffs }
    }

    pub fn zero() -> Self {
        Self { coeffs: vec![0.0] }
    }

    pub fn constant(c: f64) -> Self {
        Self::new(vec![c])
    }

    /// The monomial `s`.
    pub fn s() -> Self {
        Self {
            coeffs: vec![1.0, 0.0],
        }
    }

    /// Monic polynomial with the given roots.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a root is non-finite or the complex roots do
    /// not come in conjugate pairs (the product would have complex coefficients).
    pub fn from_roots(roots: &[Complex64]) -> LtiResult<Self> {
        let mut acc = vec![Complex64::new(1.0, 0.0)];
        for r in roots {
            if !r.re.is_finite() || !r.im.is_finite() {
                return Err(LtiError::invalid_input("root is not finite"));
            }
            let mut next = vec![Complex64::new(0.0, 0.0); acc.len() + 1];
            for (i, a) in acc.iter().enumerate() {
                next[i] += a;
                next[i + 1] -= a * r;
            }
            acc = next;
        }

        let scale = acc.iter().map(|c| c.norm()).fold(1.0, f64::max);
        if acc.iter().any(|c| c.im.abs() > 1e-9 * scale) {
            return Err(LtiError::invalid_input(
                "complex roots must come in conjugate pairs",
            ));
        }
        Ok(Self::new(acc.iter().map(|c| c.re).collect::<Vec<_>>()))
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0] == 0.0
    }

    pub fn leading(&self) -> f64 {
        self.coeffs[0]
    }

    /// Coefficient of `s^power` (zero when out of range).
    pub fn coeff_of_power(&self, power: usize) -> f64 {
        let deg = self.degree();
        if power > deg {
            0.0
        } else {
            self.coeffs[deg - power]
        }
    }

    /// Largest coefficient magnitude.
    pub fn max_abs(&self) -> f64 {
        self.coeffs.iter().fold(0.0, |m, c| m.max(c.abs()))
    }

    /// Multiplicity of the root at `s = 0`.
    pub fn trailing_zeros(&self) -> usize {
        if self.is_zero() {
            return 0;
        }
        self.coeffs.iter().rev().take_while(|c| **c == 0.0).count()
    }

    /// Divide out `s^k`; `k` must not exceed `trailing_zeros()`.
    pub fn shift_down(&self, k: usize) -> Self {
        let k = k.min(self.trailing_zeros());
        Self::new(self.coeffs[..self.coeffs.len() - k].to_vec())
    }

    pub fn scale(&self, k: f64) -> Self {
        Self::new(self.coeffs.iter().map(|c| c * k).collect::<Vec<_>>())
    }

    pub fn derivative(&self) -> Self {
        let deg = self.degree();
        if deg == 0 {
            return Self::zero();
        }
        let coeffs: Vec<f64> = self.coeffs[..deg]
            .iter()
            .enumerate()
            .map(|(i, c)| c * (deg - i) as f64)
            .collect();
        Self::new(coeffs)
    }

    /// Horner evaluation at a real point.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().fold(0.0, |acc, c| acc * x + c)
    }

    /// Horner evaluation at a complex point.
    pub fn eval_complex(&self, s: Complex64) -> Complex64 {
        self.coeffs
            .iter()
            .fold(Complex64::new(0.0, 0.0), |acc, c| acc * s + *c)
    }

    /// Long division: `self = q * divisor + r` with `deg r < deg divisor`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when dividing by the zero polynomial.
    pub fn div_rem(&self, divisor: &Polynomial) -> LtiResult<(Polynomial, Polynomial)> {
        if divisor.is_zero() {
            return Err(LtiError::invalid_input("division by zero polynomial"));
        }
        let dd = divisor.degree();
        if self.degree() < dd {
            return Ok((Self::zero(), self.clone()));
        }

        let mut rem = self.coeffs.clone();
        let qlen = self.degree() - dd + 1;
        let mut quot = vec![0.0; qlen];
        let lead = divisor.leading();
        for i in 0..qlen {
            let factor = rem[i] / lead;
            quot[i] = factor;
            for (j, d) in divisor.coeffs.iter().enumerate() {
                rem[i + j] -= factor * d;
            }
            rem[i] = 0.0;
        }
        Ok((Self::new(quot), Self::new(rem[qlen..].to_vec())))
    }

    /// All complex roots, with multiplicity.
    ///
    /// Zero roots are peeled off exactly; the rest are eigenvalues of the
    /// companion matrix, polished with guarded Newton steps. Conjugate pairs
    /// are returned exactly symmetric and the list is sorted by real part,
    /// then imaginary part.
    ///
    /// # Errors
    ///
    /// Returns `Invariant` if the eigenvalue iteration hits its cap.
    pub fn roots(&self) -> LtiResult<Vec<Complex64>> {
        if self.degree() == 0 {
            return Ok(Vec::new());
        }

        let zeros = self.trailing_zeros();
        let reduced = self.shift_down(zeros);
        let mut roots = vec![Complex64::new(0.0, 0.0); zeros];

        match reduced.degree() {
            0 => {}
            1 => roots.push(Complex64::new(
                -reduced.coeffs[1] / reduced.coeffs[0],
                0.0,
            )),
            n => {
                let lead = reduced.leading();
                let mut companion = DMatrix::<f64>::zeros(n, n);
                for j in 0..n {
                    companion[(0, j)] = -reduced.coeffs[j + 1] / lead;
                }
                for i in 1..n {
                    companion[(i, i - 1)] = 1.0;
                }

                let schur = Schur::try_new(companion, f64::EPSILON, SCHUR_MAX_ITER).ok_or(
                    LtiError::Invariant {
                        what: "companion eigenvalue iteration did not converge",
                    },
                )?;
                let derivative = reduced.derivative();

                for z in schur.complex_eigenvalues().iter() {
                    let snap = IMAG_SNAP_REL * z.norm().max(1.0);
                    if z.im.abs() <= snap {
                        let r = reduced.polish(&derivative, Complex64::new(z.re, 0.0));
                        roots.push(Complex64::new(r.re, 0.0));
                    } else if z.im > 0.0 {
                        let r = reduced.polish(&derivative, *z);
                        if r.im.abs() <= snap {
                            roots.push(Complex64::new(r.re, 0.0));
                            roots.push(Complex64::new(r.re, 0.0));
                        } else {
                            let upper = Complex64::new(r.re, r.im.abs());
                            roots.push(upper);
                            roots.push(upper.conj());
                        }
                    }
                }
            }
        }

        for r in roots.iter_mut() {
            // normalizes -0.0
            r.re += 0.0;
            r.im += 0.0;
        }
        sort_roots(&mut roots);
        Ok(roots)
    }

    /// Newton refinement that only accepts steps reducing |p(z)|.
    fn polish(&self, derivative: &Polynomial, mut z: Complex64) -> Complex64 {
        let mut residual = self.eval_complex(z).norm();
        for _ in 0..POLISH_STEPS {
            let d = derivative.eval_complex(z);
            if d.norm() == 0.0 || residual == 0.0 {
                break;
            }
            let candidate = z - self.eval_complex(z) / d;
            let r = self.eval_complex(candidate).norm();
            if r.is_finite() && r < residual {
                z = candidate;
                residual = r;
            } else {
                break;
            }
        }
        z
    }

    /// Real roots only (imaginary part exactly zero after cleaning).
    pub fn real_roots(&self) -> LtiResult<Vec<f64>> {
        Ok(self
            .roots()?
            .into_iter()
            .filter(|r| r.im == 0.0)
            .map(|r| r.re)
            .collect())
    }
}

/// Deterministic ordering: real part, then imaginary part.
pub fn sort_roots(roots: &mut [Complex64]) {
    roots.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        let mut out = vec![0.0; n];
        for (i, c) in self.coeffs.iter().rev().enumerate() {
            out[n - 1 - i] += c;
        }
        for (i, c) in rhs.coeffs.iter().rev().enumerate() {
            out[n - 1 - i] += c;
        }
        Polynomial::new(out)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.scale(-1.0)
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        self + &(-rhs)
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut out = vec![0.0; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in rhs.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Polynomial::new(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex64, b: Complex64, tol: f64) -> bool {
        (a - b).norm() <= tol
    }

    #[test]
    fn trims_leading_zeros() {
        let p = Polynomial::new(vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(p.coeffs(), &[1.0, 2.0]);
        assert_eq!(p.degree(), 1);
        assert!(Polynomial::new(Vec::new()).is_zero());
    }

    #[test]
    fn arithmetic() {
        let a = Polynomial::new(vec![1.0, 1.0]);
        let b = Polynomial::new(vec![1.0, 2.0]);
        assert_eq!((&a * &b).coeffs(), &[1.0, 3.0, 2.0]);
        assert_eq!((&a + &b).coeffs(), &[2.0, 3.0]);
        assert_eq!((&a - &a).coeffs(), &[0.0]);
        assert_eq!(
            Polynomial::new(vec![1.0, 3.0, 3.0, 1.0]).derivative().coeffs(),
            &[3.0, 6.0, 3.0]
        );
    }

    #[test]
    fn div_rem_exact_and_inexact() {
        let p = Polynomial::new(vec![1.0, 3.0, 2.0]);
        let (q, r) = p.div_rem(&Polynomial::new(vec![1.0, 1.0])).unwrap();
        assert_eq!(q.coeffs(), &[1.0, 2.0]);
        assert!(r.is_zero());

        let (q, r) = p.div_rem(&Polynomial::new(vec![1.0, 0.0])).unwrap();
        assert_eq!(q.coeffs(), &[1.0, 3.0]);
        assert_eq!(r.coeffs(), &[2.0]);

        assert!(p.div_rem(&Polynomial::zero()).is_err());
    }

    #[test]
    fn roots_of_quadratic_with_conjugates() {
        let roots = Polynomial::new(vec![1.0, 2.0, 5.0]).roots().unwrap();
        assert_eq!(roots.len(), 2);
        assert!(close(roots[0], Complex64::new(-1.0, -2.0), 1e-10));
        assert!(close(roots[1], Complex64::new(-1.0, 2.0), 1e-10));
        assert_eq!(roots[0], roots[1].conj());
    }

    #[test]
    fn roots_at_origin_are_exact() {
        let roots = Polynomial::new(vec![1.0, 3.0, 2.0, 0.0]).roots().unwrap();
        assert_eq!(roots.len(), 3);
        assert!(roots.contains(&Complex64::new(0.0, 0.0)));
        assert!(close(roots[0], Complex64::new(-2.0, 0.0), 1e-10));
        assert!(close(roots[1], Complex64::new(-1.0, 0.0), 1e-10));
    }

    #[test]
    fn repeated_roots() {
        let roots = Polynomial::new(vec![1.0, 2.0, 1.0]).roots().unwrap();
        assert_eq!(roots.len(), 2);
        for r in roots {
            assert!(close(r, Complex64::new(-1.0, 0.0), 1e-6));
        }
    }

    #[test]
    fn from_roots_rejects_unpaired_complex() {
        assert!(Polynomial::from_roots(&[Complex64::new(-1.0, 1.0)]).is_err());
        let p = Polynomial::from_roots(&[Complex64::new(-1.0, 1.0), Complex64::new(-1.0, -1.0)])
            .unwrap();
        assert_eq!(p.coeffs(), &[1.0, 2.0, 2.0]);
    }

    #[test]
    fn constant_has_no_roots() {
        assert!(Polynomial::constant(3.0).roots().unwrap().is_empty());
        assert!(Polynomial::zero().roots().unwrap().is_empty());
    }
}
