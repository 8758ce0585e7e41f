//! State equations advanced by the fixed-step integrators.

use crate::error::SimResult;

/// An ODE `x' = f(t, x)` over a state type with vector-space arithmetic.
///
/// `LinearModel` implements it for companion realizations; tests use
/// scalar models.
pub trait TransientModel {
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    /// State derivative at `(t, x)`. Takes `&mut self` so models may keep
    /// scratch buffers between calls.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// `a + b`
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// `scale · a`
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// `x + h · k`, the update every explicit stage is built from.
    fn advance(&self, x: &Self::State, k: &Self::State, h: f64) -> Self::State {
        self.add(x, &self.scale(k, h))
    }
}
