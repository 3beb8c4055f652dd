/// Reentrancy finding model
use std::fmt;

use serde::{Deserialize, Serialize};

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How "write after call" is decided
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Block creation order stands in for execution order
    #[default]
    Ordered,
    /// The write block must be reachable from the call block
    Reachability,
}

impl DetectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Ordered => "ordered",
            DetectionMode::Reachability => "reachability",
        }
    }
}

/// A function where an external call precedes a state write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub detector: String,
    pub contract: String,
    pub function: String,
    pub description: String,
    pub severity: Severity,
}

impl Finding {
    pub const DETECTOR: &'static str = "reentrancy";

    pub fn reentrancy(contract: &str, function: &str, description: String) -> Self {
        Self {
            detector: Self::DETECTOR.to_string(),
            contract: contract.to_string(),
            function: function.to_string(),
            description,
            severity: Severity::High,
        }
    }

    /// `Contract.function`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.contract, self.function)
    }
}
