//! Request bodies. Field names follow the public endpoint contracts.

use lti_core::ComplexPoint;
use serde::{Deserialize, Serialize};

/// `{numerator[], denominator[]}`, highest power first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TfRequest {
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
}

/// One characteristic-equation coefficient: a number or an expression string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coefficient {
    Number(f64),
    Text(String),
}

impl Coefficient {
    pub fn to_expression(&self) -> String {
        match self {
            Coefficient::Number(v) => format!("{v:e}"),
            Coefficient::Text(s) => s.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityRangeRequest {
    pub denominator_coeffs: Vec<Coefficient>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RootLocusRequest {
    #[serde(default)]
    pub zeros: Vec<ComplexPoint>,
    pub poles: Vec<ComplexPoint>,
}

fn unit_gain() -> f64 {
    1.0
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRequest {
    #[serde(default)]
    pub zeros: Vec<ComplexPoint>,
    pub poles: Vec<ComplexPoint>,
    #[serde(default = "unit_gain")]
    pub gain: f64,
}

/// Shared by the three compensator endpoints; each reads the targets it needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignRequest {
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
    #[serde(default)]
    pub desired_phase_margin: Option<f64>,
    #[serde(default)]
    pub desired_kv: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficients_accept_numbers_and_strings() {
        let req: StabilityRangeRequest =
            serde_json::from_str(r#"{"denominator_coeffs": [1, "3", 2.5, "x"]}"#).unwrap();
        let exprs: Vec<String> = req.denominator_coeffs.iter().map(Coefficient::to_expression).collect();
        assert_eq!(exprs[1], "3");
        assert_eq!(exprs[3], "x");
        assert_eq!(exprs[0].parse::<f64>().unwrap(), 1.0);
        assert_eq!(exprs[2].parse::<f64>().unwrap(), 2.5);
    }

    #[test]
    fn frequency_gain_defaults_to_one() {
        let req: FrequencyRequest =
            serde_json::from_str(r#"{"poles": [{"real": -1.0, "imag": 0.0}]}"#).unwrap();
        assert_eq!(req.gain, 1.0);
        assert!(req.zeros.is_empty());
    }
}
