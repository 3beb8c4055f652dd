//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::features::reentrancy::domain::DetectionMode;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI: standalone functions only
    ///
    /// - Inlining disabled
    /// - Sequential
    Fast,

    /// Default analysis
    ///
    /// - Direct internal callees inlined
    /// - Ordered detection
    /// - Contracts analyzed in parallel
    Balanced,

    /// Audit: deeper inlining, stricter ordering
    ///
    /// - Inlining depth 4
    /// - Reachability detection
    Thorough,
}

impl Preset {
    pub fn inline_depth(&self) -> usize {
        match self {
            Self::Fast => 0,
            Self::Balanced => 1,
            Self::Thorough => 4,
        }
    }

    pub fn detection_mode(&self) -> DetectionMode {
        match self {
            Self::Thorough => DetectionMode::Reachability,
            _ => DetectionMode::Ordered,
        }
    }

    pub fn parallel(&self) -> bool {
        !matches!(self, Self::Fast)
    }

    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
