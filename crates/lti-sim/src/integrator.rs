//! Fixed-step time integrators.

use crate::error::SimResult;
use crate::model::TransientModel;

/// One explicit step of a fixed-step scheme.
pub trait Integrator {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Classical fourth-order Runge-Kutta.
#[derive(Clone, Copy, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let half = 0.5 * dt;
        let k1 = model.rhs(t, x)?;
        let k2 = model.rhs(t + half, &model.advance(x, &k1, half))?;
        let k3 = model.rhs(t + half, &model.advance(x, &k2, half))?;
        let k4 = model.rhs(t + dt, &model.advance(x, &k3, dt))?;

        // k1 + 2 k2 + 2 k3 + k4
        let inner = model.add(&k2, &k3);
        let weighted = model.add(&model.advance(&k1, &inner, 2.0), &k4);
        Ok(model.advance(x, &weighted, dt / 6.0))
    }
}

/// Forward Euler, one derivative evaluation per step.
#[derive(Clone, Copy, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let k = model.rhs(t, x)?;
        Ok(model.advance(x, &k, dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x' = -x
    struct Decay;

    impl TransientModel for Decay {
        type State = f64;

        fn initial_state(&self) -> f64 {
            1.0
        }

        fn rhs(&mut self, _t: f64, x: &f64) -> SimResult<f64> {
            Ok(-x)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, s: f64) -> f64 {
            a * s
        }
    }

    #[test]
    fn rk4_is_more_accurate_than_euler() {
        let dt = 0.1;
        let exact = (-dt as f64).exp();
        let rk = RK4.step(&mut Decay, 0.0, &1.0, dt).unwrap();
        let fe = ForwardEuler.step(&mut Decay, 0.0, &1.0, dt).unwrap();
        assert!((rk - exact).abs() < 1e-6);
        assert!((fe - 0.9).abs() < 1e-12);
        assert!((rk - exact).abs() < (fe - exact).abs());
    }
}
