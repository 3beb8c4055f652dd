//! Analysis configuration
//!
//! Start from a preset, then override individual knobs:
//!
//! ```rust,ignore
//! let config = AnalysisConfig::preset(Preset::Balanced)
//!     .inline_depth(2)
//!     .honor_reentrancy_guards(true);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult, Preset};
use crate::features::reentrancy::domain::DetectionMode;
use crate::features::reentrancy::infrastructure::ReentrancyDetector;

/// Largest accepted inlining depth
pub const MAX_INLINE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub preset: Preset,
    /// 0 disables inlining; 1 splices direct internal callees only
    pub inline_depth: usize,
    pub detection_mode: DetectionMode,
    /// Analyze contracts and artifacts on the rayon pool
    pub parallel: bool,
    /// Skip functions with a `nonReentrant`-style modifier
    pub honor_reentrancy_guards: bool,
}

impl AnalysisConfig {
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            inline_depth: preset.inline_depth(),
            detection_mode: preset.detection_mode(),
            parallel: preset.parallel(),
            honor_reentrancy_guards: false,
        }
    }

    pub fn inline_depth(mut self, depth: usize) -> Self {
        self.inline_depth = depth;
        self
    }

    pub fn detection_mode(mut self, mode: DetectionMode) -> Self {
        self.detection_mode = mode;
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn honor_reentrancy_guards(mut self, enabled: bool) -> Self {
        self.honor_reentrancy_guards = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.inline_depth > MAX_INLINE_DEPTH {
            return Err(ConfigError::range_with_hint(
                "inline_depth",
                self.inline_depth,
                0,
                MAX_INLINE_DEPTH,
                "Use 0 to disable inlining, 1 for direct callees only",
            ));
        }
        Ok(())
    }

    /// Detector configured from this analysis
    pub fn detector(&self) -> ReentrancyDetector {
        ReentrancyDetector::new(self.detection_mode).with_guards(self.honor_reentrancy_guards)
    }

    pub fn describe(&self) -> String {
        format!(
            "preset={} inline_depth={} detection={} parallel={} guards={}",
            self.preset,
            self.inline_depth,
            self.detection_mode.as_str(),
            self.parallel,
            self.honor_reentrancy_guards
        )
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}
