//! Configuration I/O (YAML)

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, ConfigError, ConfigResult, Preset};
use crate::features::reentrancy::domain::DetectionMode;

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_depth: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_mode: Option<DetectionMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub honor_reentrancy_guards: Option<bool>,
}

impl AnalysisConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let mut config = Self::preset(Preset::from_str(&export.preset)?);
        if let Some(overrides) = export.overrides {
            if let Some(depth) = overrides.inline_depth {
                config.inline_depth = depth;
            }
            if let Some(mode) = overrides.detection_mode {
                config.detection_mode = mode;
            }
            if let Some(parallel) = overrides.parallel {
                config.parallel = parallel;
            }
            if let Some(guards) = overrides.honor_reentrancy_guards {
                config.honor_reentrancy_guards = guards;
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.to_string(),
            overrides: Some(ConfigOverrides {
                inline_depth: Some(self.inline_depth),
                detection_mode: Some(self.detection_mode),
                parallel: Some(self.parallel),
                honor_reentrancy_guards: Some(self.honor_reentrancy_guards),
            }),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}
