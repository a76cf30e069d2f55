//! Policy configuration for deduction and refund rules

use serde::{Deserialize, Serialize};

use crate::types::{DepositError, DepositResult};

/// Tunable limits applied by the deduction ledger and refund calculator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPolicy {
    /// A deduction larger than this share of the remaining balance is flagged
    #[serde(default = "default_warning_threshold_percent")]
    pub warning_threshold_percent: u32,
    /// Maximum length of a deduction description
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
    /// Maximum length of deduction and refund notes
    #[serde(default = "default_max_notes_length")]
    pub max_notes_length: usize,
}

fn default_warning_threshold_percent() -> u32 {
    80
}

fn default_max_description_length() -> usize {
    500
}

fn default_max_notes_length() -> usize {
    1000
}

impl Default for DepositPolicy {
    fn default() -> Self {
        Self {
            warning_threshold_percent: default_warning_threshold_percent(),
            max_description_length: default_max_description_length(),
            max_notes_length: default_max_notes_length(),
        }
    }
}

impl DepositPolicy {
    /// Load from `config/deposit.toml` (optional) and `DEPOSIT__*` environment variables
    pub fn load() -> DepositResult<Self> {
        Self::load_from("config/deposit")
    }

    /// Load from the given config file base name (optional) and the environment
    pub fn load_from(path: &str) -> DepositResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("DEPOSIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| DepositError::Configuration(e.to_string()))?;

        Self::from_config(config)
    }

    /// Parse a policy from inline TOML
    pub fn from_toml_str(toml: &str) -> DepositResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .map_err(|e| DepositError::Configuration(e.to_string()))?;

        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> DepositResult<Self> {
        let policy: Self = config
            .try_deserialize()
            .map_err(|e| DepositError::Configuration(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check that the limits are usable
    pub fn validate(&self) -> DepositResult<()> {
        if self.warning_threshold_percent > 100 {
            return Err(DepositError::Configuration(format!(
                "warning_threshold_percent must be between 0 and 100, got {}",
                self.warning_threshold_percent
            )));
        }

        if self.max_description_length == 0 {
            return Err(DepositError::Configuration(
                "max_description_length must be greater than zero".to_string(),
            ));
        }

        if self.max_notes_length == 0 {
            return Err(DepositError::Configuration(
                "max_notes_length must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
