//! Call site model

use serde::Serialize;

use crate::shared::models::SourceLocation;

/// How a call leaves (or stays in) the current contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CallType {
    Internal,
    External,
    LowLevelExternal,
    Delegatecall,
    Staticcall,
    Revert,
    /// Language built-ins and library helpers (`keccak256`, `arr.push`)
    Builtin,
}

impl CallType {
    /// Tag used in rendered SSA calls
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Internal => "internal",
            CallType::External => "external",
            CallType::LowLevelExternal => "low_level_external",
            CallType::Delegatecall => "delegatecall",
            CallType::Staticcall => "staticcall",
            CallType::Revert => "revert",
            CallType::Builtin => "builtin",
        }
    }

    pub fn in_contract(&self) -> bool {
        matches!(self, CallType::Internal)
    }

    /// Hands control to code outside the contract
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            CallType::External
                | CallType::LowLevelExternal
                | CallType::Delegatecall
                | CallType::Staticcall
        )
    }
}

impl std::fmt::Display for CallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub name: String,
    pub call_type: CallType,
    pub location: SourceLocation,
}

impl CallSite {
    pub fn new(name: impl Into<String>, call_type: CallType, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            call_type,
            location,
        }
    }

    pub fn in_contract(&self) -> bool {
        self.call_type.in_contract()
    }

    pub fn is_external(&self) -> bool {
        self.call_type.is_external()
    }
}
