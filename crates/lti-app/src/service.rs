//! One function per endpoint.
//!
//! Each takes its typed request and the engine configuration, calls the
//! owning engine and converts its error into the application taxonomy.

use lti_design::{
    Design, LagCompensator, LagLeadCompensator, LeadCompensator, design_lag, design_lag_lead,
    design_lead,
};
use lti_freq::FrequencyAnalysis;
use lti_locus::RootLocus;
use lti_portrait::PhasePortrait;
use lti_stability::StabilityRange;
use lti_time::{InverseRequest, InverseResult, TimeAnalysis};
use tracing::info_span;

use crate::config::EngineConfig;
use crate::contracts::{
    Coefficient, DesignRequest, FrequencyRequest, RootLocusRequest, StabilityRangeRequest,
    TfRequest,
};
use crate::error::{AppError, AppResult};

fn required(value: Option<f64>, name: &str) -> AppResult<f64> {
    value.ok_or_else(|| AppError::InvalidInput(format!("{name} is required")))
}

/// `analyze_tf`: stability verdict and unit-step metrics.
pub fn analyze_tf(req: &TfRequest, cfg: &EngineConfig) -> AppResult<TimeAnalysis> {
    let _span = info_span!("analyze_tf").entered();
    Ok(lti_time::analyze(&req.numerator, &req.denominator, &cfg.step)?)
}

/// `inverse_analyze_tf`: never fails; unsolvable figures give a null result.
pub fn inverse_analyze_tf(req: &InverseRequest, cfg: &EngineConfig) -> InverseResult {
    lti_time::inverse_analyze(req, &cfg.inverse)
}

pub fn analyze_stability_range(
    req: &StabilityRangeRequest,
    cfg: &EngineConfig,
) -> AppResult<StabilityRange> {
    let _span = info_span!("analyze_stability_range", n = req.denominator_coeffs.len()).entered();
    let exprs: Vec<String> = req
        .denominator_coeffs
        .iter()
        .map(Coefficient::to_expression)
        .collect();
    Ok(lti_stability::analyze_stability_range(&exprs, &cfg.routh)?)
}

pub fn plot_root_locus(req: &RootLocusRequest, cfg: &EngineConfig) -> AppResult<RootLocus> {
    let _span = info_span!("plot_root_locus", poles = req.poles.len(), zeros = req.zeros.len())
        .entered();
    Ok(lti_locus::root_locus(&req.zeros, &req.poles, &cfg.locus)?)
}

pub fn analyze_frequency_domain(
    req: &FrequencyRequest,
    cfg: &EngineConfig,
) -> AppResult<FrequencyAnalysis> {
    let _span = info_span!("analyze_frequency_domain", gain = req.gain).entered();
    Ok(lti_freq::analyze_zpk(&req.zeros, &req.poles, req.gain, &cfg.frequency)?)
}

pub fn design_lead_compensator(
    req: &DesignRequest,
    cfg: &EngineConfig,
) -> AppResult<Design<LeadCompensator>> {
    let pm = required(req.desired_phase_margin, "desired_phase_margin")?;
    let _span = info_span!("design_lead", pm).entered();
    Ok(design_lead(&req.numerator, &req.denominator, pm, &cfg.design_options())?)
}

pub fn design_lag_compensator(
    req: &DesignRequest,
    cfg: &EngineConfig,
) -> AppResult<Design<LagCompensator>> {
    let kv = required(req.desired_kv, "desired_kv")?;
    let _span = info_span!("design_lag", kv).entered();
    Ok(design_lag(&req.numerator, &req.denominator, kv, &cfg.design_options())?)
}

pub fn design_lag_lead_compensator(
    req: &DesignRequest,
    cfg: &EngineConfig,
) -> AppResult<Design<LagLeadCompensator>> {
    let pm = required(req.desired_phase_margin, "desired_phase_margin")?;
    let kv = required(req.desired_kv, "desired_kv")?;
    Ok(design_lag_lead(
        &req.numerator,
        &req.denominator,
        pm,
        kv,
        &cfg.design_options(),
    )?)
}

pub fn plot_phase_portrait(req: &TfRequest, cfg: &EngineConfig) -> AppResult<PhasePortrait> {
    let _span = info_span!("plot_phase_portrait").entered();
    Ok(lti_portrait::phase_portrait(
        &req.numerator,
        &req.denominator,
        &cfg.portrait,
    )?)
}
