//! Error types for solgraph-ir
//!
//! Provides unified error handling across the crate. Malformed AST shapes
//! are not errors here: accessors default and analysis continues.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::ssa::infrastructure::SsaError;

/// Main error type for solgraph-ir operations
#[derive(Debug, Error)]
pub enum SolgraphError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// External build tool could not be run
    #[error("Build error: {0}")]
    Build(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Internal pipeline invariant broken
    #[error("Invariant violated: {0}")]
    Invariant(#[from] SsaError),

    /// Artifact has no usable AST
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SolgraphError {
    pub fn parse_error(msg: impl Into<String>) -> Self {
        SolgraphError::Parse(msg.into())
    }

    pub fn build(msg: impl Into<String>) -> Self {
        SolgraphError::Build(msg.into())
    }
}

/// Result type alias for solgraph operations
pub type Result<T> = std::result::Result<T, SolgraphError>;
