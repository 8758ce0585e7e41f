//! Phase-lead compensation.
//!
//! `Gc(s) = Kc·(s + z)/(s + p)` with `z = ωm·√α`, `p = ωm/√α` and
//! `α = (1 − sin φ)/(1 + sin φ)`. The network supplies its peak lead `φ` at
//! `ωm`, chosen where the uncompensated loop gain is `10·log10 α` dB, and
//! `Kc` makes the compensated loop gain exactly 0 dB there.

use lti_core::{Complex64, TransferFunction};
use lti_freq::{FactoredResponse, magnitude_crossing, margin_grid, margins};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DesignError, DesignResult, invalid, unreachable};
use crate::options::DesignOptions;
use crate::performance::{Design, finish, plant};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeadCompensator {
    /// Zero location, `-z`
    pub zero: f64,
    /// Pole location, `-p`
    pub pole: f64,
    pub alpha: f64,
    /// Frequency of peak phase lead and new gain crossover
    pub omega_m: f64,
    pub gain: f64,
    /// Phase lead supplied at `omega_m`, degrees
    pub phase_lead: f64,
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
}

impl LeadCompensator {
    pub fn transfer_function(&self) -> DesignResult<TransferFunction> {
        Ok(TransferFunction::new(&self.numerator, &self.denominator)?)
    }
}

pub(crate) fn check_phase_margin(desired: f64) -> DesignResult<()> {
    if desired.is_finite() && desired > 0.0 && desired < 180.0 {
        Ok(())
    } else {
        Err(invalid("desired phase margin must lie in (0, 180) degrees"))
    }
}

/// Lead network that lifts the phase margin of `open_loop` to `desired_pm`.
pub(crate) fn lead_stage(
    open_loop: &TransferFunction,
    desired_pm: f64,
    opts: &DesignOptions,
) -> DesignResult<LeadCompensator> {
    let resp = FactoredResponse::from_tf(open_loop)?;
    let current = margins(&resp, &opts.frequency)?;
    let pm = current.phase_margin_deg.ok_or_else(|| {
        unreachable("the loop has no gain crossover, so its phase margin is undefined")
    })?;

    let required = desired_pm - pm + opts.safety_margin;
    if required <= 0.0 {
        return Err(DesignError::TargetAlreadyMet {
            what: format!(
                "current phase margin {pm:.2} deg already meets the desired {desired_pm:.2} deg"
            ),
        });
    }
    if required > opts.max_phase_lead {
        return Err(unreachable(format!(
            "required phase lead {required:.2} deg exceeds the single-stage limit of {:.0} deg",
            opts.max_phase_lead
        )));
    }

    let sin_phi = required.to_radians().sin();
    let alpha = (1.0 - sin_phi) / (1.0 + sin_phi);
    let grid = margin_grid(&resp, &opts.frequency)?;
    let omega_m = magnitude_crossing(&resp, &grid, alpha.sqrt(), opts.frequency.bisection_iterations)
        .ok_or_else(|| {
            unreachable(format!(
                "loop gain never reaches {:.2} dB, so no crossover for the lead network exists",
                10.0 * alpha.log10()
            ))
        })?;

    let z = omega_m * alpha.sqrt();
    let p = omega_m / alpha.sqrt();
    let s = Complex64::new(0.0, omega_m);
    let network = (s + z) / (s + p);
    let gain = 1.0 / (network.norm() * resp.eval(omega_m).norm());
    debug!(pm, required, alpha, omega_m, gain, "lead stage");

    Ok(LeadCompensator {
        zero: -z,
        pole: -p,
        alpha,
        omega_m,
        gain,
        phase_lead: required,
        numerator: vec![gain, gain * z],
        denominator: vec![1.0, p],
    })
}

/// Lead design for a phase-margin target.
///
/// # Errors
///
/// - `InvalidInput` for an invalid plant or target
/// - `TargetAlreadyMet` when no lead is needed
/// - `UnreachableDesignTarget` when the lead required exceeds the
///   single-stage limit or no crossover exists
pub fn design_lead(
    numerator: &[f64],
    denominator: &[f64],
    desired_phase_margin: f64,
    opts: &DesignOptions,
) -> DesignResult<Design<LeadCompensator>> {
    check_phase_margin(desired_phase_margin)?;
    let g = plant(numerator, denominator)?;
    let lead = lead_stage(&g, desired_phase_margin, opts)?;
    let compensated = lead.transfer_function()?.series(&g);
    finish(
        "Lead compensator designed successfully.",
        lead,
        &g,
        &compensated,
        Vec::new(),
        opts,
    )
}
