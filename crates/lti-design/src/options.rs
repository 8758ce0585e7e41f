use lti_freq::FrequencyOptions;
use lti_sim::StepOptions;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignOptions {
    /// Extra phase lead (degrees) added to cover the crossover shift
    pub safety_margin: f64,
    /// Largest phase lead (degrees) a single lead stage may supply
    pub max_phase_lead: f64,
    /// Phase lag (degrees) the lag network may contribute at crossover
    pub lag_phase_allowance: f64,
    /// Cap on lag refinement iterations
    pub max_iterations: usize,
    /// Relative change of the lag zero accepted as converged
    pub tolerance: f64,
    pub frequency: FrequencyOptions,
    pub step: StepOptions,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self {
            safety_margin: 5.0,
            max_phase_lead: 65.0,
            lag_phase_allowance: 5.0,
            max_iterations: 50,
            tolerance: 1e-6,
            frequency: FrequencyOptions::default(),
            step: StepOptions::default(),
        }
    }
}
