//! Nyquist trace.
//!
//! Poles on the imaginary axis are bypassed with the usual small-semicircle
//! indentation: samples within the indentation radius of such a pole are
//! dropped from the trace and the indentation is reported instead.

use lti_core::wrap_degrees;
use serde::{Deserialize, Serialize};

use crate::grid::FrequencyOptions;
use crate::response::FactoredResponse;

/// Behaviour of the trace as `ω → 0+`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NyquistAsymptote {
    /// Bounded at low frequency
    None,
    /// One free integrator: the trace runs along `Re = value`
    VerticalLine { value: f64 },
    /// Two or more integrators: unbounded along `direction_deg`
    Unbounded {
        integrators: usize,
        direction_deg: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Indentation {
    /// Frequency of the imaginary-axis pole
    pub omega: f64,
    pub radius: f64,
    /// Number of grid samples removed inside the indentation
    pub dropped: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NyquistData {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
    pub frequency: Vec<f64>,
    pub asymptote: NyquistAsymptote,
    pub indentations: Vec<Indentation>,
}

/// Low-frequency asymptote from the factored form.
///
/// With one integrator `H(s) = h(s)/s` and `h(s) = h0 + h1·s + ...`, so
/// `Re H(jω) → h1 = h'(0)`.
pub fn nyquist_asymptote(resp: &FactoredResponse) -> NyquistAsymptote {
    match resp.integrators() {
        n if n <= 0 => NyquistAsymptote::None,
        1 => {
            let origin = resp.origin_tolerance;
            let zeros: Vec<_> = resp.zeros.iter().filter(|z| z.norm() > origin).collect();
            let poles: Vec<_> = resp.poles.iter().filter(|p| p.norm() > origin).collect();
            // h'(0)/h(0) = Σ 1/(0 - z) - Σ 1/(0 - p) over the non-origin factors
            let log_derivative: f64 = zeros.iter().map(|z| (-z.inv()).re).sum::<f64>()
                - poles.iter().map(|p| (-p.inv()).re).sum::<f64>();
            let value = resp.low_frequency_gain() * log_derivative;
            if value.is_finite() {
                NyquistAsymptote::VerticalLine { value: value + 0.0 }
            } else {
                NyquistAsymptote::None
            }
        }
        n => {
            let base = if resp.low_frequency_gain() < 0.0 { 180.0 } else { 0.0 };
            NyquistAsymptote::Unbounded {
                integrators: n as usize,
                direction_deg: wrap_degrees(base - 90.0 * n as f64),
            }
        }
    }
}

/// Trace on `grid` with indentations around imaginary-axis poles.
pub fn nyquist_on_grid(
    resp: &FactoredResponse,
    grid: &[f64],
    opts: &FrequencyOptions,
) -> NyquistData {
    let mut indentations: Vec<Indentation> = resp
        .axis_pole_frequencies()
        .into_iter()
        .map(|omega| Indentation {
            omega,
            radius: opts.indentation_radius * omega.max(1.0),
            dropped: 0,
        })
        .collect();

    let mut real = Vec::with_capacity(grid.len());
    let mut imag = Vec::with_capacity(grid.len());
    let mut frequency = Vec::with_capacity(grid.len());
    for &w in grid {
        if let Some(ind) = indentations
            .iter_mut()
            .find(|i| (w - i.omega).abs() < i.radius)
        {
            ind.dropped += 1;
            continue;
        }
        let h = resp.eval(w);
        if h.re.is_finite() && h.im.is_finite() {
            real.push(h.re);
            imag.push(h.im);
            frequency.push(w);
        }
    }

    NyquistData {
        real,
        imag,
        frequency,
        asymptote: nyquist_asymptote(resp),
        indentations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lti_core::TransferFunction;

    fn resp(num: &[f64], den: &[f64]) -> FactoredResponse {
        FactoredResponse::from_tf(&TransferFunction::new(num, den).unwrap()).unwrap()
    }

    #[test]
    fn type_one_vertical_line() {
        // 1 / (s (s + 1)): Re G(jω) = -1 / (1 + ω²) → -1
        let a = nyquist_asymptote(&resp(&[1.0], &[1.0, 1.0, 0.0]));
        match a {
            NyquistAsymptote::VerticalLine { value } => assert!((value + 1.0).abs() < 1e-12),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn type_one_with_zero() {
        // (s + 2) / (s (s + 1)): h = (s+2)/(s+1), h'(0) = (1·1 - 2·1)/1 = -1
        let a = nyquist_asymptote(&resp(&[1.0, 2.0], &[1.0, 1.0, 0.0]));
        assert_eq!(a, NyquistAsymptote::VerticalLine { value: -1.0 });
    }

    #[test]
    fn type_two_is_unbounded() {
        let a = nyquist_asymptote(&resp(&[1.0], &[1.0, 1.0, 0.0, 0.0]));
        assert_eq!(
            a,
            NyquistAsymptote::Unbounded {
                integrators: 2,
                direction_deg: 180.0
            }
        );
        assert_eq!(nyquist_asymptote(&resp(&[1.0], &[1.0, 1.0])), NyquistAsymptote::None);
    }

    #[test]
    fn axis_poles_are_indented() {
        // 1 / (s^2 + 1): pole at ω = 1
        let r = resp(&[1.0], &[1.0, 0.0, 1.0]);
        let grid = lti_core::log_sweep(0.1, 10.0, 2001).unwrap();
        let n = nyquist_on_grid(&r, &grid, &FrequencyOptions::default());
        assert_eq!(n.indentations.len(), 1);
        assert!(n.indentations[0].dropped > 0);
        assert!(n.frequency.iter().all(|w| (w - 1.0).abs() >= 1e-3));
        assert_eq!(n.real.len() + n.indentations[0].dropped, grid.len());
    }

    #[test]
    fn asymptote_serializes_with_type_tag() {
        let json = serde_json::to_value(NyquistAsymptote::VerticalLine { value: -1.0 }).unwrap();
        assert_eq!(json["type"], "vertical_line");
        assert_eq!(json["value"], -1.0);
    }
}
