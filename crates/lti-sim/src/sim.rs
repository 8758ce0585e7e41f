//! Fixed-step driver with decimated recording and an optional stop predicate.

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    #[default]
    RK4,
    ForwardEuler,
}

#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Step size, seconds
    pub dt: f64,
    pub t_end: f64,
    /// Hard cap on steps; the run ends early when it is reached
    pub max_steps: usize,
    /// Keep one state out of every `record_every` steps
    pub record_every: usize,
    pub integrator: IntegratorType,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            t_end: 1.0,
            max_steps: 100_000,
            record_every: 10,
            integrator: IntegratorType::RK4,
        }
    }
}

/// Recorded trajectory. The initial and final states are always present.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    pub t: Vec<f64>,
    pub x: Vec<S>,
    /// The stop predicate fired before `t_end`
    pub stopped_early: bool,
}

/// Run a fixed-step simulation to `t_end`.
pub fn run_sim<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    run_sim_until(model, opts, |_, _| false)
}

/// Run a fixed-step simulation that ends at the first state for which
/// `stop(t, x)` holds; that state is recorded.
pub fn run_sim_until<M, F>(
    model: &mut M,
    opts: &SimOptions,
    stop: F,
) -> SimResult<SimRecord<M::State>>
where
    M: TransientModel,
    F: FnMut(f64, &M::State) -> bool,
{
    let x0 = model.initial_state();
    let (integrator, dt) = (opts.integrator, opts.dt);
    run_map_until(
        x0,
        opts,
        |t, x| match integrator {
            IntegratorType::RK4 => RK4.step(model, t, x, dt),
            IntegratorType::ForwardEuler => ForwardEuler.step(model, t, x, dt),
        },
        stop,
    )
}

/// Iterate a one-step map `x(k+1) = advance(t(k), x(k))` on the `opts` time
/// grid, with the recording and stop rules of [`run_sim_until`].
pub fn run_map_until<S, G, F>(
    x0: S,
    opts: &SimOptions,
    mut advance: G,
    mut stop: F,
) -> SimResult<SimRecord<S>>
where
    S: Clone,
    G: FnMut(f64, &S) -> SimResult<S>,
    F: FnMut(f64, &S) -> bool,
{
    if opts.dt <= 0.0 || !opts.dt.is_finite() {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if opts.t_end < 0.0 || !opts.t_end.is_finite() {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let mut t = 0.0;
    let mut x = x0;

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];
    let mut stopped_early = false;

    let mut step = 0;
    // half-step slack keeps float drift from adding a spurious extra step
    while t + 0.5 * opts.dt < opts.t_end && step < opts.max_steps {
        x = advance(t, &x)?;
        step += 1;
        t = step as f64 * opts.dt;

        if stop(t, &x) {
            stopped_early = true;
            break;
        }

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }
    }

    if step % opts.record_every != 0 || stopped_early {
        t_record.push(t);
        x_record.push(x);
    }

    Ok(SimRecord {
        t: t_record,
        x: x_record,
        stopped_early,
    })
}
