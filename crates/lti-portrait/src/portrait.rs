//! Trajectory integration over a grid of initial conditions.

use std::f64::consts::PI;

use lti_core::{Complex64, TransferFunction, linear_sweep};
use lti_sim::{IntegratorType, LinearModel, LinearScheme, SimOptions, StateSpace};
use nalgebra::DVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::classify::{EquilibriumAnalysis, classify_equilibrium};
use crate::error::{PortraitError, PortraitResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PortraitOptions {
    /// Initial conditions span `[-grid_extent, grid_extent]` on both axes
    pub grid_extent: f64,
    pub grid_points: usize,
    /// Steps per trajectory
    pub steps: usize,
    /// RK4 is used while `dt · max|λ|` stays within this; stiffer systems
    /// are stepped exactly through the hold map
    pub fast_mode_fraction: f64,
    /// Horizon in multiples of the slowest decay time constant
    pub settling_multiple: f64,
    pub max_horizon: f64,
    /// Horizon for purely oscillatory systems, in periods of the slowest mode
    pub oscillation_periods: f64,
    pub fallback_horizon: f64,
    /// Integration stops outside `bounding_box_factor · grid_extent`
    pub bounding_box_factor: f64,
    /// Relative tolerance for treating a real or imaginary part as zero
    pub axis_tolerance: f64,
}

impl Default for PortraitOptions {
    fn default() -> Self {
        Self {
            grid_extent: 10.0,
            grid_points: 9,
            steps: 500,
            fast_mode_fraction: 0.2,
            settling_multiple: 5.0,
            max_horizon: 100.0,
            oscillation_periods: 5.0,
            fallback_horizon: 20.0,
            bounding_box_factor: 5.0,
            axis_tolerance: 1e-8,
        }
    }
}

/// One trajectory in the `(x, dx/dt)` plane.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhasePortrait {
    pub message: String,
    pub trajectories: Vec<Trajectory>,
    pub equilibrium_analysis: EquilibriumAnalysis,
    /// Integration horizon in seconds
    pub horizon: f64,
}

/// Integration horizon from the eigenvalues.
///
/// `settling_multiple / σ` for the slowest non-zero decay or growth rate
/// `σ` (capped), otherwise `oscillation_periods` periods of the slowest
/// oscillation, otherwise `fallback_horizon`.
pub fn portrait_horizon(eigenvalues: &[Complex64], opts: &PortraitOptions) -> f64 {
    let zero = |v: f64, l: &Complex64| v.abs() <= opts.axis_tolerance * l.norm().max(1.0);
    let slowest_rate = eigenvalues
        .iter()
        .filter(|l| !zero(l.re, l))
        .map(|l| l.re.abs())
        .fold(f64::INFINITY, f64::min);
    if slowest_rate.is_finite() {
        return (opts.settling_multiple / slowest_rate).min(opts.max_horizon);
    }
    let slowest_freq = eigenvalues
        .iter()
        .filter(|l| !zero(l.im, l))
        .map(|l| l.im.abs())
        .fold(f64::INFINITY, f64::min);
    if slowest_freq.is_finite() {
        return opts.oscillation_periods * 2.0 * PI / slowest_freq;
    }
    opts.fallback_horizon
}

fn validate(opts: &PortraitOptions) -> PortraitResult<()> {
    if !(opts.grid_extent.is_finite() && opts.grid_extent > 0.0) {
        return Err(PortraitError::invalid("grid_extent must be positive"));
    }
    if opts.grid_points < 2 || opts.steps == 0 {
        return Err(PortraitError::invalid(
            "grid_points must be at least 2 and steps positive",
        ));
    }
    if !(opts.fast_mode_fraction > 0.0) {
        return Err(PortraitError::invalid("fast_mode_fraction must be positive"));
    }
    if !(opts.bounding_box_factor >= 1.0) {
        return Err(PortraitError::invalid("bounding_box_factor must be at least 1"));
    }
    Ok(())
}

/// Phase portrait of the autonomous companion realization of `num/den`.
///
/// Second-order and higher systems start from every grid point
/// `(x1, x2)` except the origin, with remaining states zero, and plot the
/// first two states. First-order systems start from the grid abscissae and
/// plot `(x, λx)`.
///
/// # Errors
///
/// `InvalidInput` for an improper or zero-order system, or invalid options.
pub fn phase_portrait(
    numerator: &[f64],
    denominator: &[f64],
    opts: &PortraitOptions,
) -> PortraitResult<PhasePortrait> {
    validate(opts)?;
    let tf = TransferFunction::new(numerator, denominator)?;
    if !tf.is_proper() {
        return Err(PortraitError::invalid(
            "numerator degree cannot exceed denominator degree",
        ));
    }
    let order = tf.order();
    if order == 0 {
        return Err(PortraitError::invalid("system must have at least one pole"));
    }

    let ss = StateSpace::companion(&tf)?;
    let eigenvalues = tf.poles()?;
    let equilibrium = classify_equilibrium(&eigenvalues, opts.axis_tolerance)
        .ok_or_else(|| PortraitError::invalid("system must have at least one pole"))?;
    let horizon = portrait_horizon(&eigenvalues, opts);
    let _span = info_span!("phase_portrait", order, horizon, kind = %equilibrium.kind).entered();

    let axis = linear_sweep(-opts.grid_extent, opts.grid_extent, opts.grid_points)?;
    let starts: Vec<(f64, f64)> = if order == 1 {
        axis.iter().filter(|x| **x != 0.0).map(|x| (*x, 0.0)).collect()
    } else {
        axis.iter()
            .flat_map(|x| axis.iter().map(move |y| (*x, *y)))
            .filter(|(x, y)| !(*x == 0.0 && *y == 0.0))
            .collect()
    };

    let dt = horizon / opts.steps as f64;
    let fastest = eigenvalues.iter().map(|l| l.norm()).fold(0.0, f64::max);
    let scheme = LinearScheme::for_step(dt, fastest, opts.fast_mode_fraction);
    debug!(dt, fastest, ?scheme, "portrait stepping");
    let sim_opts = SimOptions {
        dt,
        t_end: horizon,
        max_steps: opts.steps,
        record_every: 1,
        integrator: IntegratorType::RK4,
    };
    let bound = opts.bounding_box_factor * opts.grid_extent;

    let trajectories = starts
        .par_iter()
        .map(|&(x0, y0)| integrate(&ss, x0, y0, scheme, &sim_opts, bound))
        .collect::<PortraitResult<Vec<_>>>()?;
    debug!(trajectories = trajectories.len(), "phase portrait integrated");

    Ok(PhasePortrait {
        message: "Phase portrait data generated successfully.".to_string(),
        trajectories,
        equilibrium_analysis: equilibrium,
        horizon,
    })
}

fn integrate(
    ss: &StateSpace,
    x0: f64,
    y0: f64,
    scheme: LinearScheme,
    sim_opts: &SimOptions,
    bound: f64,
) -> PortraitResult<Trajectory> {
    let n = ss.order();
    let mut init = DVector::zeros(n);
    init[0] = x0;
    if n >= 2 {
        init[1] = y0;
    }
    let mut model = LinearModel::free(ss, init);
    let record = model.run_until(scheme, sim_opts, |_, x| {
        x.iter().take(2).any(|v| !v.is_finite() || v.abs() > bound)
    })?;

    let (x, y): (Vec<f64>, Vec<f64>) = if n >= 2 {
        record.x.iter().map(|s| (s[0], s[1])).unzip()
    } else {
        let rate = ss.a[(0, 0)];
        record.x.iter().map(|s| (s[0], rate * s[0])).unzip()
    };
    Ok(Trajectory { x, y })
}
