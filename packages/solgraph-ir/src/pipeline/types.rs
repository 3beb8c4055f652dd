//! Pipeline result types
//!
//! Everything here is built once per contract and never mutated after
//! detection. All maps are ordered so serialized output is stable.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::features::flow_graph::domain::BasicBlock;
use crate::features::interprocedural::domain::{CallSite, CallType};
use crate::features::reentrancy::domain::Finding;
use crate::features::ssa::domain::SsaBlock;
use crate::shared::models::{AstNode, SourceLocation};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateVar {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionInfo {
    pub visibility: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventInfo {
    pub name: String,
    pub location: SourceLocation,
}

/// One analyzed entrypoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSummary {
    pub name: String,
    pub visibility: String,
    pub location: SourceLocation,
    #[serde(skip)]
    pub body_raw: Option<AstNode>,
    pub modifiers: Vec<String>,
    pub blocks: Vec<BasicBlock>,
    pub ssa: Vec<SsaBlock>,
    pub calls: Vec<CallSite>,
}

impl FunctionSummary {
    /// Distinct callee names of the given kind, first-seen order
    fn callee_names(&self, keep: impl Fn(CallType) -> bool) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for call in self.calls.iter().filter(|c| keep(c.call_type)) {
            if !names.contains(&call.name) {
                names.push(call.name.clone());
            }
        }
        names
    }

    pub fn internal_calls(&self) -> Vec<String> {
        self.callee_names(|t| t.in_contract())
    }

    pub fn external_calls(&self) -> Vec<String> {
        self.callee_names(|t| t.is_external())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractSummary {
    pub name: String,
    pub pragma: String,
    pub state_vars: Vec<StateVar>,
    pub functions: BTreeMap<String, FunctionInfo>,
    pub events: Vec<EventInfo>,
    pub entrypoints: Vec<FunctionSummary>,
}

impl ContractSummary {
    pub fn entrypoint(&self, name: &str) -> Option<&FunctionSummary> {
        self.entrypoints.iter().find(|f| f.name == name)
    }
}

/// Summary plus the detector's verdicts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractAnalysis {
    pub summary: ContractSummary,
    pub findings: Vec<Finding>,
}

/// Contracts of one AST artifact, with the matching source text when known
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactAnalysis {
    pub path: PathBuf,
    #[serde(skip)]
    pub source: Option<String>,
    pub contracts: Vec<ContractAnalysis>,
}

impl ArtifactAnalysis {
    pub fn finding_count(&self) -> usize {
        self.contracts.iter().map(|c| c.findings.len()).sum()
    }
}
