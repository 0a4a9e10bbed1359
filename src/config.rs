//! # Wizard Configuration
//!
//! Layered configuration: embedded defaults, then an optional config file,
//! then `WIZARD__*` environment variables (e.g. `WIZARD__SHOW_BACK=true`).

use crate::error::{Result, WizardError};
use crate::wizard::step::{StepDefinition, StepSequence};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default location searched by [`WizardConfig::load`], any supported extension
pub const DEFAULT_CONFIG_NAME: &str = "config/wizard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Enables backward navigation between steps
    pub show_back: bool,
    /// Capacity of the state-change notification channel
    pub event_channel_capacity: usize,
    /// Static step layout, used by [`WizardConfig::step_sequence`]
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    pub label: String,
    #[serde(default)]
    pub optional: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            show_back: false,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            steps: Vec::new(),
        }
    }
}

impl WizardConfig {
    /// Load from `config/wizard.*` if present, then the environment
    pub fn load() -> Result<Self> {
        Self::load_layered(None)
    }

    /// Load from an explicit file, then the environment. The file must exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layered(Some(path.as_ref()))
    }

    fn load_layered(path: Option<&Path>) -> Result<Self> {
        let defaults = serde_json::to_string(&Self::default())
            .map_err(|e| WizardError::Configuration(format!("Invalid defaults: {e}")))?;

        let mut builder = ::config::Config::builder()
            .add_source(::config::File::from_str(&defaults, ::config::FileFormat::Json));

        builder = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading wizard configuration file");
                builder.add_source(::config::File::from(path).required(true))
            }
            None => builder
                .add_source(::config::File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        builder = builder.add_source(
            ::config::Environment::with_prefix("WIZARD")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            show_back = config.show_back,
            event_channel_capacity = config.event_channel_capacity,
            step_count = config.steps.len(),
            "Wizard configuration loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_channel_capacity == 0 {
            return Err(WizardError::Configuration(
                "event_channel_capacity must be greater than zero".to_string(),
            ));
        }

        if let Some(position) = self.steps.iter().position(|s| s.label.trim().is_empty()) {
            return Err(WizardError::Configuration(format!(
                "steps[{position}] has a blank label"
            )));
        }

        Ok(())
    }

    /// Build the step sequence described by `steps`, indices by position
    pub fn step_sequence(&self) -> Result<StepSequence> {
        StepSequence::new(
            self.steps
                .iter()
                .enumerate()
                .map(|(index, step)| StepDefinition::new(index, step.label.clone(), step.optional))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WizardConfig::default();
        assert!(!config.show_back);
        assert_eq!(config.event_channel_capacity, DEFAULT_EVENT_CHANNEL_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = WizardConfig {
            event_channel_capacity: 0,
            ..WizardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WizardError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_step_label() {
        let config = WizardConfig {
            steps: vec![
                StepConfig {
                    label: "Create".to_string(),
                    optional: false,
                },
                StepConfig {
                    label: " ".to_string(),
                    optional: true,
                },
            ],
            ..WizardConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("steps[1]"));
    }

    #[test]
    fn test_step_sequence_from_config() {
        let config = WizardConfig {
            steps: vec![
                StepConfig {
                    label: "Create Repository".to_string(),
                    optional: false,
                },
                StepConfig {
                    label: "Import Data".to_string(),
                    optional: true,
                },
            ],
            ..WizardConfig::default()
        };

        let sequence = config.step_sequence().unwrap();
        assert_eq!(sequence.len(), 2);
        assert!(sequence.get(1).unwrap().is_optional());

        assert!(WizardConfig::default().step_sequence().is_err());
    }
}
