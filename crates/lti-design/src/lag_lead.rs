//! Lag-lead compensation: a lag stage for the velocity constant, then a lead
//! stage for the phase margin against the lag-compensated loop.

use lti_core::{Polynomial, TransferFunction};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::error::{DesignError, DesignResult};
use crate::lag::{LagCompensator, check_kv, lag_stage, plant_kv};
use crate::lead::{LeadCompensator, check_phase_margin, lead_stage};
use crate::options::DesignOptions;
use crate::performance::{Design, finish, plant};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LagLeadCompensator {
    /// `None` when the plant already meets the Kv target
    pub lag: Option<LagCompensator>,
    /// `None` when the lag-compensated loop already meets the phase margin
    pub lead: Option<LeadCompensator>,
    /// Combined `Gc(s)` numerator, highest power first
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
    /// Why a stage was skipped
    #[serde(default)]
    pub notes: Vec<String>,
}

impl LagLeadCompensator {
    pub fn transfer_function(&self) -> DesignResult<TransferFunction> {
        Ok(TransferFunction::new(&self.numerator, &self.denominator)?)
    }
}

/// Lag-lead design for a combined Kv and phase-margin target.
///
/// # Errors
///
/// - `InvalidInput` for an invalid plant or targets
/// - `TargetAlreadyMet` when neither stage is needed
/// - `UnreachableDesignTarget` when either stage cannot be realized
pub fn design_lag_lead(
    numerator: &[f64],
    denominator: &[f64],
    desired_phase_margin: f64,
    desired_kv: f64,
    opts: &DesignOptions,
) -> DesignResult<Design<LagLeadCompensator>> {
    let _span = info_span!("design_lag_lead", desired_phase_margin, desired_kv).entered();
    check_phase_margin(desired_phase_margin)?;
    check_kv(desired_kv)?;
    let g = plant(numerator, denominator)?;
    let kv = plant_kv(&g)?;

    let mut notes = Vec::new();
    let mut warnings = Vec::new();

    let lag = if desired_kv <= kv * (1.0 + 1e-9) {
        notes.push(format!(
            "lag stage skipped: plant Kv {kv:.4} already meets the desired {desired_kv:.4}"
        ));
        None
    } else {
        let (lag, warning) = lag_stage(&g, desired_kv / kv, opts)?;
        warnings.extend(warning);
        Some(lag)
    };

    let after_lag = match &lag {
        Some(l) => l.transfer_function()?.series(&g),
        None => g.clone(),
    };

    let lead = match lead_stage(&after_lag, desired_phase_margin, opts) {
        Ok(lead) => Some(lead),
        Err(DesignError::TargetAlreadyMet { what }) => {
            notes.push(format!("lead stage skipped: {what}"));
            None
        }
        Err(e) => return Err(e),
    };

    if lag.is_none() && lead.is_none() {
        return Err(DesignError::TargetAlreadyMet {
            what: notes.join("; "),
        });
    }

    let mut num = Polynomial::constant(1.0);
    let mut den = Polynomial::constant(1.0);
    if let Some(l) = &lag {
        num = &num * &Polynomial::new(l.numerator.clone());
        den = &den * &Polynomial::new(l.denominator.clone());
    }
    if let Some(l) = &lead {
        num = &num * &Polynomial::new(l.numerator.clone());
        den = &den * &Polynomial::new(l.denominator.clone());
    }
    debug!(
        lag = lag.is_some(),
        lead = lead.is_some(),
        order = den.degree(),
        "lag-lead stages combined"
    );

    let compensator = LagLeadCompensator {
        lag,
        lead,
        numerator: num.coeffs().to_vec(),
        denominator: den.coeffs().to_vec(),
        notes,
    };
    let compensated = compensator.transfer_function()?.series(&g);
    finish(
        "Lag-Lead compensator designed successfully.",
        compensator,
        &g,
        &compensated,
        warnings,
        opts,
    )
}
