//! Phase-variable (controllable companion) state-space realization.

use lti_core::TransferFunction;
use nalgebra::{DMatrix, DVector};

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use crate::sim::{SimOptions, SimRecord, run_map_until, run_sim_until};

/// `x' = A x + B u`, `y = C x + D u`.
#[derive(Clone, Debug)]
pub struct StateSpace {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DVector<f64>,
    pub d: f64,
}

impl StateSpace {
    /// Realize a proper transfer function in companion form.
    ///
    /// State `x1` is the partial state `z` with `den(s) z = u`, and
    /// `x(k+1) = x(k)'`, so the first two states span the phase plane
    /// `(z, dz/dt)`. The state matrix has ones on the superdiagonal and the
    /// negated, normalized denominator coefficients on its last row.
    ///
    /// # Errors
    ///
    /// Returns `Improper` when the numerator degree exceeds the denominator's.
    pub fn companion(tf: &TransferFunction) -> SimResult<Self> {
        if !tf.is_proper() {
            return Err(SimError::Improper {
                what: "numerator degree exceeds denominator degree",
            });
        }

        let n = tf.order();
        let den = tf.denominator();
        let num = tf.numerator();
        let lead = den.leading();

        // a[k] and b[k] multiply s^(n-k)
        let a: Vec<f64> = (0..=n).map(|k| den.coeff_of_power(n - k) / lead).collect();
        let b: Vec<f64> = (0..=n).map(|k| num.coeff_of_power(n - k) / lead).collect();

        let mut a_mat = DMatrix::<f64>::zeros(n, n);
        for i in 0..n.saturating_sub(1) {
            a_mat[(i, i + 1)] = 1.0;
        }
        for j in 0..n {
            a_mat[(n - 1, j)] = -a[n - j];
        }

        let mut b_vec = DVector::<f64>::zeros(n);
        if n > 0 {
            b_vec[n - 1] = 1.0;
        }

        let c_vec = DVector::from_iterator(n, (0..n).map(|j| b[n - j] - b[0] * a[n - j]));

        Ok(Self {
            a: a_mat,
            b: b_vec,
            c: c_vec,
            d: b[0],
        })
    }

    pub fn order(&self) -> usize {
        self.a.nrows()
    }

    pub fn output(&self, x: &DVector<f64>, u: f64) -> f64 {
        self.c.dot(x) + self.d * u
    }

    /// Exact zero-order-hold discretization over one step of length `dt`.
    ///
    /// `exp([[A, B], [0, 0]]·dt) = [[Φ, Γ], [0, 1]]`, which also covers a
    /// singular `A`.
    pub fn hold_map(&self, dt: f64) -> SimResult<HoldMap> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        let n = self.order();
        let mut m = DMatrix::<f64>::zeros(n + 1, n + 1);
        for i in 0..n {
            for j in 0..n {
                m[(i, j)] = self.a[(i, j)] * dt;
            }
            m[(i, n)] = self.b[i] * dt;
        }
        let e = m.exp();
        if e.iter().any(|v| !v.is_finite()) {
            return Err(SimError::Backend {
                message: format!("matrix exponential is not finite for dt = {dt}"),
            });
        }
        Ok(HoldMap {
            phi: e.view((0, 0), (n, n)).into_owned(),
            gamma: DVector::from_iterator(n, (0..n).map(|i| e[(i, n)])),
        })
    }
}

/// `x(k+1) = Φ x(k) + Γ u` for an input held constant over the step.
#[derive(Clone, Debug)]
pub struct HoldMap {
    pub phi: DMatrix<f64>,
    pub gamma: DVector<f64>,
}

impl HoldMap {
    pub fn step(&self, x: &DVector<f64>, u: f64) -> DVector<f64> {
        &self.phi * x + &self.gamma * u
    }
}

/// How a linear model is advanced on a fixed grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinearScheme {
    RK4,
    /// Exact stepping through [`HoldMap`]; stable for any step size.
    ExactHold,
}

impl LinearScheme {
    /// RK4 while `dt · fastest` stays within `rk4_limit`, the hold map beyond.
    pub fn for_step(dt: f64, fastest: f64, rk4_limit: f64) -> Self {
        if dt * fastest <= rk4_limit {
            LinearScheme::RK4
        } else {
            LinearScheme::ExactHold
        }
    }
}

/// Constant-input linear model driven through `TransientModel`.
pub struct LinearModel<'a> {
    ss: &'a StateSpace,
    input: f64,
    x0: DVector<f64>,
}

impl<'a> LinearModel<'a> {
    /// Zero initial state, constant input `u`.
    pub fn forced(ss: &'a StateSpace, input: f64) -> Self {
        Self {
            ss,
            input,
            x0: DVector::zeros(ss.order()),
        }
    }

    /// Autonomous motion (`u = 0`) from `x0`.
    pub fn free(ss: &'a StateSpace, x0: DVector<f64>) -> Self {
        Self { ss, input: 0.0, x0 }
    }

    /// Simulate on the `opts` grid with `scheme`, stopping at the first
    /// state for which `stop(t, x)` holds.
    pub fn run_until<F>(
        &mut self,
        scheme: LinearScheme,
        opts: &SimOptions,
        stop: F,
    ) -> SimResult<SimRecord<DVector<f64>>>
    where
        F: FnMut(f64, &DVector<f64>) -> bool,
    {
        match scheme {
            LinearScheme::RK4 => run_sim_until(self, opts, stop),
            LinearScheme::ExactHold => {
                let map = self.ss.hold_map(opts.dt)?;
                let u = self.input;
                run_map_until(self.x0.clone(), opts, |_, x| Ok(map.step(x, u)), stop)
            }
        }
    }
}

impl TransientModel for LinearModel<'_> {
    type State = DVector<f64>;

    fn initial_state(&self) -> DVector<f64> {
        self.x0.clone()
    }

    fn rhs(&mut self, _t: f64, x: &DVector<f64>) -> SimResult<DVector<f64>> {
        Ok(&self.ss.a * x + &self.ss.b * self.input)
    }

    fn add(&self, a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
        a + b
    }

    fn scale(&self, a: &DVector<f64>, scale: f64) -> DVector<f64> {
        a * scale
    }
}
