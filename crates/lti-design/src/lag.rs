//! Phase-lag compensation for a velocity-constant target.
//!
//! `Gc(s) = (s + z)/(s + z/β)`: unit gain at high frequency, gain `β` at DC,
//! so Kv rises by `β`. The zero is placed so that the network's own phase
//! lag at the compensated crossover equals the lag allowance. Because the
//! crossover itself moves with the zero, the placement is refined as a
//! fixed point, capped at `max_iterations`.

use lti_core::{Complex64, TransferFunction};
use lti_freq::{FactoredResponse, magnitude_crossing, margin_grid};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DesignError, DesignResult, invalid, unreachable};
use crate::options::DesignOptions;
use crate::performance::{Design, finish, plant};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LagCompensator {
    /// Zero location, `-z`
    pub zero: f64,
    /// Pole location, `-z/β`
    pub pole: f64,
    pub beta: f64,
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

impl LagCompensator {
    pub fn transfer_function(&self) -> DesignResult<TransferFunction> {
        Ok(TransferFunction::new(&self.numerator, &self.denominator)?)
    }
}

/// Phase lag (degrees, positive) of the network at `ω = r·z`.
pub fn lag_phase_deg(beta: f64, r: f64) -> f64 {
    ((beta * r).atan() - r.atan()).to_degrees()
}

/// Ratio `r = ωc/z` at which the network lags by `allowance_deg`.
///
/// The lag peaks at `r = 1/√β` with `asin((β − 1)/(β + 1))` and decays
/// above it; the solution is taken on the decaying side. When the peak lag
/// is already within the allowance the zero goes a decade below crossover.
pub fn lag_ratio(beta: f64, allowance_deg: f64) -> f64 {
    let peak_r = 1.0 / beta.sqrt();
    let peak = ((beta - 1.0) / (beta + 1.0)).asin().to_degrees();
    if !(beta > 1.0) || allowance_deg >= peak || allowance_deg <= 0.0 {
        return 10f64.max(peak_r);
    }
    let f = |r: f64| lag_phase_deg(beta, r) - allowance_deg;
    let mut lo = peak_r;
    let mut hi = peak_r * 2.0;
    for _ in 0..200 {
        if f(hi) < 0.0 {
            break;
        }
        lo = hi;
        hi *= 2.0;
    }
    for _ in 0..100 {
        let mid = (lo * hi).sqrt();
        if f(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo * hi).sqrt()
}

/// Velocity constant of a type-1 plant.
pub(crate) fn plant_kv(g: &TransferFunction) -> DesignResult<f64> {
    let ty = g.system_type();
    if ty != 1 {
        return Err(unreachable(format!(
            "lag compensation needs a type-1 plant; this plant is type {ty}"
        )));
    }
    g.velocity_constant()
        .filter(|kv| kv.is_finite() && *kv > 0.0)
        .ok_or_else(|| unreachable("plant velocity constant must be positive and finite"))
}

pub(crate) fn check_kv(desired: f64) -> DesignResult<()> {
    if desired.is_finite() && desired > 0.0 {
        Ok(())
    } else {
        Err(invalid("desired Kv must be positive and finite"))
    }
}

fn with_lag(resp: &FactoredResponse, z: f64, beta: f64) -> FactoredResponse {
    let mut out = resp.clone();
    out.zeros.push(Complex64::new(-z, 0.0));
    out.poles.push(Complex64::new(-z / beta, 0.0));
    out
}

/// Lag network raising the velocity constant of `open_loop` by `beta`.
/// Returns the network and a convergence warning, if any.
pub(crate) fn lag_stage(
    open_loop: &TransferFunction,
    beta: f64,
    opts: &DesignOptions,
) -> DesignResult<(LagCompensator, Option<String>)> {
    let resp = FactoredResponse::from_tf(open_loop)?;
    let grid = margin_grid(&resp, &opts.frequency)?;
    let bisection = opts.frequency.bisection_iterations;
    let wc0 = magnitude_crossing(&resp, &grid, 1.0, bisection)
        .ok_or_else(|| unreachable("the loop has no gain crossover to place the lag network against"))?;

    let r = lag_ratio(beta, opts.lag_phase_allowance);
    let mut z = wc0 / r;
    let mut iterations = 0;
    let mut change = f64::INFINITY;
    let mut converged = false;
    while iterations < opts.max_iterations {
        iterations += 1;
        let Some(wc) = magnitude_crossing(&with_lag(&resp, z, beta), &grid, 1.0, bisection) else {
            break;
        };
        let next = wc / r;
        change = (next - z).abs() / z;
        z = next;
        if change <= opts.tolerance {
            converged = true;
            break;
        }
    }

    let warning = if converged {
        None
    } else {
        warn!(iterations, change, "lag placement did not converge");
        Some(format!(
            "ConvergenceWarning: lag zero placement did not converge within {} iterations (last relative change {change:.2e}); best estimate returned",
            opts.max_iterations
        ))
    };
    debug!(beta, r, z, iterations, converged, "lag stage");

    let p = z / beta;
    Ok((
        LagCompensator {
            zero: -z,
            pole: -p,
            beta,
            numerator: vec![1.0, z],
            denominator: vec![1.0, p],
            iterations,
            converged,
        },
        warning,
    ))
}

/// Lag design for a velocity-constant target.
///
/// # Errors
///
/// - `InvalidInput` for an invalid plant or target
/// - `TargetAlreadyMet` when the plant's Kv equals the target
/// - `UnreachableDesignTarget` for a plant that is not type 1, a target
///   below the plant's Kv, or a loop without gain crossover
pub fn design_lag(
    numerator: &[f64],
    denominator: &[f64],
    desired_kv: f64,
    opts: &DesignOptions,
) -> DesignResult<Design<LagCompensator>> {
    check_kv(desired_kv)?;
    let g = plant(numerator, denominator)?;
    let kv = plant_kv(&g)?;
    if (desired_kv - kv).abs() <= 1e-9 * kv {
        return Err(DesignError::TargetAlreadyMet {
            what: format!("plant Kv {kv:.4} already equals the desired Kv"),
        });
    }
    if desired_kv < kv {
        return Err(unreachable(format!(
            "desired Kv {desired_kv:.4} is below the plant's Kv {kv:.4}; a lag network can only raise it"
        )));
    }

    let (lag, warning) = lag_stage(&g, desired_kv / kv, opts)?;
    let compensated = lag.transfer_function()?.series(&g);
    finish(
        "Lag compensator designed successfully.",
        lag,
        &g,
        &compensated,
        warning.into_iter().collect(),
        opts,
    )
}
