//! Unit-step response of a transfer function.

use lti_core::{Complex64, TransferFunction};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::sim::{IntegratorType, SimOptions, run_sim_until};
use crate::state_space::{LinearModel, LinearScheme, StateSpace};

/// Step-response simulation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StepOptions {
    /// Horizon in multiples of the slowest time constant
    pub horizon_time_constants: f64,
    /// Upper bound on the horizon (seconds)
    pub max_horizon: f64,
    /// Target number of integration steps across the horizon
    pub steps_per_horizon: usize,
    /// Step size is kept below this fraction of the fastest pole's time constant
    pub fast_pole_fraction: f64,
    /// Hard cap on integration steps
    pub max_steps: usize,
    /// Approximate number of samples returned
    pub output_points: usize,
    /// Stop once |y| exceeds this multiple of `max(1, |DC gain|)`
    pub divergence_limit: f64,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            horizon_time_constants: 10.0,
            max_horizon: 1.0e4,
            steps_per_horizon: 4000,
            fast_pole_fraction: 0.2,
            max_steps: 200_000,
            output_points: 4000,
            divergence_limit: 1.0e6,
        }
    }
}

/// Sampled unit-step response.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StepResponse {
    pub time: Vec<f64>,
    pub response: Vec<f64>,
}

/// Simulation horizon chosen from the pole locations.
///
/// Stable systems run for `horizon_time_constants` slowest time constants;
/// otherwise the smallest non-zero pole magnitude sets the scale.
pub fn step_horizon(poles: &[Complex64], opts: &StepOptions) -> f64 {
    if poles.is_empty() {
        return 1.0;
    }
    let stable = poles.iter().all(|p| p.re < 0.0);
    let scale = if stable {
        poles.iter().map(|p| -p.re).fold(f64::INFINITY, f64::min)
    } else {
        poles
            .iter()
            .map(|p| p.norm())
            .filter(|m| *m > 1e-9)
            .fold(f64::INFINITY, f64::min)
    };
    let scale = if scale.is_finite() { scale } else { 1.0 };
    (opts.horizon_time_constants / scale.max(1e-6)).min(opts.max_horizon)
}

/// Step simulation at full resolution plus the decimated view.
#[derive(Clone, Debug)]
pub struct StepRun {
    /// About `output_points` samples, for plotting
    pub response: StepResponse,
    /// Every integration step, for metric extraction
    pub full: StepResponse,
    /// The divergence limit ended the run before the horizon
    pub diverged: bool,
    pub scheme: LinearScheme,
}

/// Simulate the unit-step response on the companion realization.
///
/// The step is kept below `fast_pole_fraction` of the fastest time constant
/// and RK4 is used. When that would take more than `max_steps` steps the grid
/// is coarsened to fit the cap and the exact hold map takes over, so stiff
/// stable systems stay stable on the coarse grid.
///
/// # Errors
///
/// Returns `Improper` for improper transfer functions and `InvalidArg` for
/// inconsistent options.
pub fn simulate_step(tf: &TransferFunction, opts: &StepOptions) -> SimResult<StepRun> {
    if opts.steps_per_horizon == 0 || opts.max_steps == 0 || opts.output_points == 0 {
        return Err(SimError::InvalidArg {
            what: "step response sample counts must be positive",
        });
    }

    let ss = StateSpace::companion(tf)?;
    let poles = tf.poles()?;
    let t_end = step_horizon(&poles, opts);

    let fastest = poles.iter().map(|p| p.norm()).fold(0.0, f64::max);
    let mut dt = t_end / opts.steps_per_horizon as f64;
    if fastest > 0.0 {
        dt = dt.min(opts.fast_pole_fraction / fastest);
    }
    if (t_end / dt).ceil() as usize > opts.max_steps {
        dt = t_end / opts.max_steps as f64;
    }
    let scheme = LinearScheme::for_step(dt, fastest, opts.fast_pole_fraction);
    let n_steps = ((t_end / dt).ceil() as usize).max(1);
    let record_every = n_steps.div_ceil(opts.output_points).max(1);

    debug!(
        order = ss.order(),
        t_end, dt, n_steps, record_every, ?scheme, "simulating unit step"
    );

    let sim_opts = SimOptions {
        dt,
        t_end,
        max_steps: opts.max_steps,
        record_every,
        integrator: IntegratorType::RK4,
    };

    let mut model = LinearModel::forced(&ss, 1.0);
    let limit = opts.divergence_limit * tf.dc_gain().map_or(1.0, |g| g.abs().max(1.0));
    let mut full = StepResponse {
        time: Vec::with_capacity(n_steps + 1),
        response: Vec::with_capacity(n_steps + 1),
    };
    full.time.push(0.0);
    full.response.push(ss.d);
    let record = model.run_until(scheme, &sim_opts, |t, x| {
        let y = ss.output(x, 1.0);
        full.time.push(t);
        full.response.push(y);
        !y.is_finite() || y.abs() > limit
    })?;

    if record.stopped_early {
        debug!(t = record.t.last().copied(), "step response diverged, stopped");
    }

    let response = record.x.iter().map(|x| ss.output(x, 1.0)).collect();
    Ok(StepRun {
        response: StepResponse {
            time: record.t,
            response,
        },
        full,
        diverged: record.stopped_early,
        scheme,
    })
}

/// Decimated unit-step response, see [`simulate_step`].
pub fn step_response(tf: &TransferFunction, opts: &StepOptions) -> SimResult<StepResponse> {
    Ok(simulate_step(tf, opts)?.response)
}
