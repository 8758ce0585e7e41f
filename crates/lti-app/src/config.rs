//! Engine configuration, loadable from YAML.
//!
//! Every section is optional and falls back to the engine defaults:
//!
//! ```yaml
//! frequency:
//!   points_per_decade: 200
//! design:
//!   safety_margin: 8.0
//! portrait:
//!   grid_points: 11
//! ```
//!
//! The design engine uses the shared `frequency` and `step` sections.

use std::path::Path;

use lti_design::DesignOptions;
use lti_freq::FrequencyOptions;
use lti_locus::LocusOptions;
use lti_portrait::PortraitOptions;
use lti_sim::StepOptions;
use lti_stability::RouthOptions;
use lti_time::InverseOptions;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub step: StepOptions,
    pub inverse: InverseOptions,
    pub routh: RouthOptions,
    pub locus: LocusOptions,
    pub frequency: FrequencyOptions,
    pub design: DesignOptions,
    pub portrait: PortraitOptions,
}

impl EngineConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Design options with the shared frequency and step sections applied.
    pub fn design_options(&self) -> DesignOptions {
        DesignOptions {
            frequency: self.frequency.clone(),
            step: self.step.clone(),
            ..self.design.clone()
        }
    }

    /// Reject settings no engine can run with.
    pub fn validate(&self) -> AppResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(AppError::Config(format!("{name} must be positive and finite")))
            }
        };
        let nonzero = |name: &str, v: usize| {
            if v > 0 {
                Ok(())
            } else {
                Err(AppError::Config(format!("{name} must be positive")))
            }
        };

        nonzero("step.steps_per_horizon", self.step.steps_per_horizon)?;
        nonzero("step.max_steps", self.step.max_steps)?;
        nonzero("step.output_points", self.step.output_points)?;
        positive("step.max_horizon", self.step.max_horizon)?;

        positive("routh.epsilon", self.routh.epsilon)?;

        positive("locus.k_min", self.locus.k_min)?;
        if !(self.locus.k_max > self.locus.k_min) {
            return Err(AppError::Config("locus.k_max must exceed locus.k_min".into()));
        }
        nonzero("locus.samples", self.locus.samples)?;

        nonzero("frequency.points_per_decade", self.frequency.points_per_decade)?;
        nonzero("frequency.max_points", self.frequency.max_points)?;
        positive("frequency.default_min_omega", self.frequency.default_min_omega)?;
        if !(self.frequency.default_max_omega > self.frequency.default_min_omega) {
            return Err(AppError::Config(
                "frequency.default_max_omega must exceed frequency.default_min_omega".into(),
            ));
        }

        nonzero("design.max_iterations", self.design.max_iterations)?;
        positive("design.max_phase_lead", self.design.max_phase_lead)?;
        if self.design.max_phase_lead >= 90.0 {
            return Err(AppError::Config("design.max_phase_lead must be below 90 degrees".into()));
        }
        positive("design.lag_phase_allowance", self.design.lag_phase_allowance)?;

        nonzero("portrait.steps", self.portrait.steps)?;
        if self.portrait.grid_points < 2 {
            return Err(AppError::Config("portrait.grid_points must be at least 2".into()));
        }
        positive("portrait.grid_extent", self.portrait.grid_extent)?;
        positive("portrait.fast_mode_fraction", self.portrait.fast_mode_fraction)?;
        Ok(())
    }
}

/// Load an engine configuration from a YAML file.
pub fn load_config(path: &Path) -> AppResult<EngineConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    EngineConfig::from_yaml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        let cfg = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg.frequency.points_per_decade, 100);
        assert_eq!(cfg.portrait.grid_points, 9);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = EngineConfig::from_yaml_str("design:\n  safety_margin: 8.0\n").unwrap();
        assert_eq!(cfg.design.safety_margin, 8.0);
        assert_eq!(cfg.design.max_iterations, 50);
    }

    #[test]
    fn shared_sections_reach_design() {
        let cfg =
            EngineConfig::from_yaml_str("frequency:\n  points_per_decade: 40\n").unwrap();
        assert_eq!(cfg.design_options().frequency.points_per_decade, 40);
    }

    #[test]
    fn invalid_values_rejected() {
        for bad in [
            "locus:\n  k_min: 10.0\n  k_max: 1.0\n",
            "frequency:\n  points_per_decade: 0\n",
            "portrait:\n  grid_points: 1\n",
            "design:\n  max_phase_lead: 95.0\n",
            "unknown_section: 1\n",
        ] {
            let err = EngineConfig::from_yaml_str(bad).unwrap_err();
            assert!(matches!(err, AppError::Config(_)), "{bad}");
        }
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_config(Path::new("/nonexistent/lti-engine.yaml")).unwrap_err();
        assert!(matches!(err, AppError::ConfigFileRead { .. }));
        assert_eq!(err.kind(), "ConfigError");
    }
}
