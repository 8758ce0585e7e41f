//! Before/after performance records and comparison plots shared by every design.

use lti_core::TransferFunction;
use lti_freq::{FactoredResponse, FrequencyOptions, bode_on_grid, frequency_grid, frequency_range, margins};
use lti_sim::step_response;
use serde::{Deserialize, Serialize};

use crate::error::{DesignResult, invalid};
use crate::options::DesignOptions;

/// Open-loop performance figures; `None` means undefined or infinite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub phase_margin: Option<f64>,
    pub gain_margin_db: Option<f64>,
    pub gain_crossover_freq: Option<f64>,
    pub phase_crossover_freq: Option<f64>,
    pub kv: Option<f64>,
}

impl PerformanceRecord {
    pub fn evaluate(open_loop: &TransferFunction, opts: &FrequencyOptions) -> DesignResult<Self> {
        let m = margins(&FactoredResponse::from_tf(open_loop)?, opts)?;
        Ok(Self {
            phase_margin: m.phase_margin_deg,
            gain_margin_db: m.gain_margin_db,
            gain_crossover_freq: m.gain_crossover_freq,
            phase_crossover_freq: m.phase_crossover_freq,
            kv: open_loop.velocity_constant(),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub before: PerformanceRecord,
    pub after: PerformanceRecord,
}

/// Open-loop Bode data of both loops on one grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodeComparison {
    pub omega: Vec<f64>,
    pub uncompensated_mag_db: Vec<f64>,
    pub uncompensated_phase_deg: Vec<f64>,
    pub compensated_mag_db: Vec<f64>,
    pub compensated_phase_deg: Vec<f64>,
}

/// Unit-step responses of both unity-feedback loops `G/(1+G)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepComparison {
    pub uncompensated_time: Vec<f64>,
    pub uncompensated_response: Vec<f64>,
    pub compensated_time: Vec<f64>,
    pub compensated_response: Vec<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignPlots {
    pub bode: BodeComparison,
    pub step_response: StepComparison,
}

/// A finished design.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Design<C> {
    pub message: String,
    pub compensator: C,
    pub performance: Performance,
    pub plots: DesignPlots,
    /// Non-fatal conditions, e.g. refinement that hit its iteration cap
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Build and check the plant `G(s)`.
pub(crate) fn plant(numerator: &[f64], denominator: &[f64]) -> DesignResult<TransferFunction> {
    let tf = TransferFunction::new(numerator, denominator)?;
    if tf.numerator().is_zero() {
        return Err(invalid("plant numerator is identically zero"));
    }
    if !tf.is_proper() {
        return Err(invalid("plant must be proper (numerator degree <= denominator degree)"));
    }
    Ok(tf)
}

fn comparison_plots(
    plant: &TransferFunction,
    compensated: &TransferFunction,
    opts: &DesignOptions,
) -> DesignResult<DesignPlots> {
    let before = FactoredResponse::from_tf(plant)?;
    let after = FactoredResponse::from_tf(compensated)?;
    let mut corners = before.corner_frequencies();
    corners.extend(after.corner_frequencies());
    let (lo, hi) = frequency_range(&corners, &opts.frequency);
    let grid = frequency_grid(lo, hi, &opts.frequency)?;
    let b = bode_on_grid(&before, &grid);
    let a = bode_on_grid(&after, &grid);

    let step_before = step_response(&plant.unity_feedback()?, &opts.step)?;
    let step_after = step_response(&compensated.unity_feedback()?, &opts.step)?;

    Ok(DesignPlots {
        bode: BodeComparison {
            omega: grid,
            uncompensated_mag_db: b.magnitude_db,
            uncompensated_phase_deg: b.phase_deg,
            compensated_mag_db: a.magnitude_db,
            compensated_phase_deg: a.phase_deg,
        },
        step_response: StepComparison {
            uncompensated_time: step_before.time,
            uncompensated_response: step_before.response,
            compensated_time: step_after.time,
            compensated_response: step_after.response,
        },
    })
}

/// Assemble a design from the plant and the compensated open loop.
pub(crate) fn finish<C>(
    message: &str,
    compensator: C,
    plant: &TransferFunction,
    compensated: &TransferFunction,
    warnings: Vec<String>,
    opts: &DesignOptions,
) -> DesignResult<Design<C>> {
    Ok(Design {
        message: message.to_string(),
        compensator,
        performance: Performance {
            before: PerformanceRecord::evaluate(plant, &opts.frequency)?,
            after: PerformanceRecord::evaluate(compensated, &opts.frequency)?,
        },
        plots: comparison_plots(plant, compensated, opts)?,
        warnings,
    })
}
