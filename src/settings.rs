use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::map_export::MapFormat;
use crate::node_config::ParseOptions;

/// Application settings, usually read from `lunarnet.yaml`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub parser: ParserSettings,
    pub resolver: ResolverSettings,
    pub map: MapSettings,
}

impl Settings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.general.config_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidGeneral(
                "config_dir cannot be empty".to_string(),
            ));
        }
        if self.general.config_extension.trim().is_empty() {
            return Err(ValidationError::InvalidGeneral(
                "config_extension cannot be empty".to_string(),
            ));
        }
        if self.map.output.as_os_str().is_empty() {
            return Err(ValidationError::InvalidMap(
                "output path cannot be empty".to_string(),
            ));
        }
        if let Some(threshold) = self.resolver.slow_call_warning {
            if threshold.is_zero() {
                return Err(ValidationError::InvalidResolver(
                    "slow_call_warning must be greater than zero".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Parser options derived from the `parser` section
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            lenient_defaults: self.parser.lenient_defaults,
        }
    }
}

/// General settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    pub log_level: String,
    /// Directory searched for topology files given by bare name
    pub config_dir: PathBuf,
    /// Extension listed by `lunarnet list`, without the dot
    pub config_extension: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            config_dir: PathBuf::from("config"),
            config_extension: "txt".to_string(),
        }
    }
}

/// Topology parser settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ParserSettings {
    /// Default missing numeric fields to 0.0 instead of rejecting the node
    pub lenient_defaults: bool,
}

/// Link resolution settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ResolverSettings {
    pub parallel: bool,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub slow_call_warning: Option<Duration>,
}

/// Map export settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MapSettings {
    pub output: PathBuf,
    pub format: MapFormat,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("output/lunar_node_map.json"),
            format: MapFormat::Json,
        }
    }
}

/// Settings validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general settings: {0}")]
    InvalidGeneral(String),
    #[error("Invalid resolver settings: {0}")]
    InvalidResolver(String),
    #[error("Invalid map settings: {0}")]
    InvalidMap(String),
}
