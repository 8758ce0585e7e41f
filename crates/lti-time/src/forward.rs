//! Forward analysis: stability verdict plus unit-step metrics.

use lti_core::complex::format_complex;
use lti_core::{Complex64, ComplexPoint, TransferFunction};
use lti_sim::{SimError, StepOptions, simulate_step};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TimeResult;
use crate::metrics::{StepMetrics, extract_metrics};

/// Real parts within this fraction of `max(1, |p|)` count as on the imaginary axis.
const AXIS_TOL: f64 = 1e-7;

/// Imaginary-axis poles closer than this are treated as one repeated pole.
const REPEAT_TOL: f64 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilityStatus {
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Marginally Stable")]
    MarginallyStable,
    #[serde(rename = "Unstable")]
    Unstable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub status: StabilityStatus,
    pub poles: Vec<ComplexPoint>,
    /// Display strings for the poles, same order as `poles`
    pub pole_labels: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeAnalysis {
    /// Present only for stable systems
    pub metrics: Option<StepMetrics>,
    pub stability: StabilityReport,
}

/// Classify from pole locations.
///
/// Any pole in the open right half plane, or a repeated pole on the
/// imaginary axis, is unstable; simple imaginary-axis poles are marginal.
pub fn classify_poles(poles: &[Complex64]) -> StabilityStatus {
    let on_axis = |p: &Complex64| p.re.abs() <= AXIS_TOL * p.norm().max(1.0);

    if poles.iter().any(|p| p.re > 0.0 && !on_axis(p)) {
        return StabilityStatus::Unstable;
    }

    let axis: Vec<&Complex64> = poles.iter().filter(|p| on_axis(p)).collect();
    for (i, a) in axis.iter().enumerate() {
        if axis[i + 1..].iter().any(|b| (**a - **b).norm() <= REPEAT_TOL) {
            return StabilityStatus::Unstable;
        }
    }

    if axis.is_empty() {
        StabilityStatus::Stable
    } else {
        StabilityStatus::MarginallyStable
    }
}

/// Analyze `num/den`: stability from the poles, and for stable systems the
/// unit-step metrics, read from every simulated step. Marginal and unstable
/// systems are not simulated.
///
/// # Errors
///
/// Fails on an invalid transfer function, an improper one that cannot be
/// simulated, or a stable system whose simulated response still diverged.
pub fn analyze(num: &[f64], den: &[f64], opts: &StepOptions) -> TimeResult<TimeAnalysis> {
    let tf = TransferFunction::new(num, den)?;
    let poles = tf.poles()?;
    let status = classify_poles(&poles);
    debug!(order = tf.order(), ?status, "time-domain analysis");

    let metrics = match (status, tf.dc_gain()) {
        (StabilityStatus::Stable, Some(final_value)) => {
            let run = simulate_step(&tf, opts)?;
            if run.diverged {
                let t = run.full.time.last().copied().unwrap_or(0.0);
                return Err(SimError::Diverged { t }.into());
            }
            Some(extract_metrics(
                &run.full.time,
                &run.full.response,
                final_value,
            ))
        }
        _ => None,
    };

    Ok(TimeAnalysis {
        metrics,
        stability: StabilityReport {
            status,
            pole_labels: poles.iter().map(|p| format_complex(*p)).collect(),
            poles: poles.into_iter().map(ComplexPoint::from).collect(),
        },
    })
}
