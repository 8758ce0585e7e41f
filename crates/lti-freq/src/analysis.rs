//! Full frequency-domain analysis of an open loop.

use lti_core::{Complex64, ComplexPoint, TransferFunction};
use serde::{Deserialize, Serialize};
use tracing::info_span;

use crate::bode::{BodeData, bode_on_grid};
use crate::error::{FreqResult, invalid};
use crate::grid::{FrequencyOptions, frequency_grid, frequency_range};
use crate::margins::{StabilityMargins, margins};
use crate::nyquist::{NyquistData, nyquist_on_grid};
use crate::response::FactoredResponse;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAnalysis {
    pub message: String,
    pub bode: BodeData,
    pub nyquist: NyquistData,
    pub stability_margins: StabilityMargins,
    /// `None` when a pole at the origin makes it unbounded
    pub dc_gain: Option<f64>,
}

/// Analyze `gain·Π(s − z)/Π(s − p)`.
///
/// # Errors
///
/// `InvalidInput` for an empty pole set, non-finite values or unpaired complex values.
pub fn analyze_zpk(
    zeros: &[ComplexPoint],
    poles: &[ComplexPoint],
    gain: f64,
    opts: &FrequencyOptions,
) -> FreqResult<FrequencyAnalysis> {
    if poles.is_empty() {
        return Err(invalid("transfer function requires at least one pole"));
    }
    if zeros.iter().chain(poles).any(|p| !p.is_finite()) {
        return Err(invalid("poles and zeros must be finite"));
    }
    let zeros: Vec<Complex64> = zeros.iter().map(|z| Complex64::from(*z)).collect();
    let poles: Vec<Complex64> = poles.iter().map(|p| Complex64::from(*p)).collect();
    analyze_response(&FactoredResponse::from_zpk(&zeros, &poles, gain)?, opts)
}

/// Analyze a transfer function in coefficient form.
pub fn analyze(tf: &TransferFunction, opts: &FrequencyOptions) -> FreqResult<FrequencyAnalysis> {
    analyze_response(&FactoredResponse::from_tf(tf)?, opts)
}

fn analyze_response(
    resp: &FactoredResponse,
    opts: &FrequencyOptions,
) -> FreqResult<FrequencyAnalysis> {
    if opts.points_per_decade == 0 || opts.max_points < 2 {
        return Err(invalid("frequency sweep needs at least 2 points"));
    }
    let _span = info_span!("frequency_analysis", poles = resp.poles.len()).entered();

    let (lo, hi) = frequency_range(&resp.corner_frequencies(), opts);
    let grid = frequency_grid(lo, hi, opts)?;
    Ok(FrequencyAnalysis {
        message: "Frequency domain analysis successful".to_string(),
        bode: bode_on_grid(resp, &grid),
        nyquist: nyquist_on_grid(resp, &grid, opts),
        stability_margins: margins(resp, opts)?,
        dc_gain: resp.dc_gain(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FreqError;

    #[test]
    fn empty_poles_rejected() {
        let err = analyze_zpk(&[], &[], 1.0, &FrequencyOptions::default()).unwrap_err();
        assert!(matches!(err, FreqError::InvalidInput { .. }));
    }

    #[test]
    fn zpk_first_order() {
        let res = analyze_zpk(
            &[],
            &[ComplexPoint::new(-1.0, 0.0)],
            2.0,
            &FrequencyOptions::default(),
        )
        .unwrap();
        assert_eq!(res.dc_gain, Some(2.0));
        assert_eq!(res.bode.omega.len(), res.bode.magnitude_db.len());
        assert!((res.bode.omega[0] - 1e-2).abs() < 1e-15);
        assert!((res.bode.magnitude_db[0] - 20.0 * 2f64.log10()).abs() < 1e-3);
        assert_eq!(res.stability_margins.gain_margin_db, None);
        assert!(res.stability_margins.gain_crossover_freq.is_some());
    }
}
