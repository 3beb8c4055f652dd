//! Configuration
//!
//! Two tiers:
//! - Preset: `AnalysisConfig::preset(Preset::Fast)`
//! - Overrides: builder setters, or a versioned YAML file
//!
//! ```rust,ignore
//! use solgraph_ir::config::{AnalysisConfig, Preset};
//!
//! let config = AnalysisConfig::preset(Preset::Thorough).parallel(false);
//! let config = AnalysisConfig::from_yaml("solgraph.yaml")?;
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;
pub mod preset;

pub use analysis_config::{AnalysisConfig, MAX_INLINE_DEPTH};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
