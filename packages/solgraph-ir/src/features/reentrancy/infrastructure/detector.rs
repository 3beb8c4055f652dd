//! ReentrancyDetector - external call followed by a state write
//!
//! ## Algorithm
//! 1. Collect blocks holding a call that leaves the contract
//!    (external, low-level, delegatecall, staticcall; never revert/builtin)
//! 2. Collect blocks holding an assignment whose destination is rooted at a
//!    state variable (`balances[a]` counts as `balances`); phis do not count
//! 3. Report when some write block comes after some call block
//!
//! "After" is block creation order in [`DetectionMode::Ordered`] and CFG
//! reachability in [`DetectionMode::Reachability`]. Both are intra-procedural.

use std::collections::BTreeSet;

use tracing::debug;

use crate::features::data_flow::domain::base_name;
use crate::features::flow_graph::infrastructure::reachable_from;
use crate::features::reentrancy::domain::{DetectionMode, Finding};
use crate::features::ssa::domain::{Instruction, SsaBlock};

/// Modifier name fragments treated as reentrancy locks
const GUARD_PATTERNS: &[&str] = &["nonreentrant", "reentrancy"];

/// What the detector needs to know about one function
#[derive(Debug, Clone, Copy)]
pub struct FunctionView<'a> {
    pub contract: &'a str,
    pub name: &'a str,
    pub modifiers: &'a [String],
    pub blocks: &'a [SsaBlock],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReentrancyDetector {
    mode: DetectionMode,
    honor_guards: bool,
}

impl ReentrancyDetector {
    pub fn new(mode: DetectionMode) -> Self {
        Self {
            mode,
            honor_guards: false,
        }
    }

    /// Skip functions carrying a `nonReentrant`-style modifier
    pub fn with_guards(mut self, honor_guards: bool) -> Self {
        self.honor_guards = honor_guards;
        self
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    pub fn check_function(
        &self,
        function: &FunctionView<'_>,
        state_vars: &BTreeSet<String>,
    ) -> Option<Finding> {
        if self.honor_guards && function.modifiers.iter().any(|m| is_reentrancy_guard(m)) {
            debug!(function = function.name, "guarded, skipped");
            return None;
        }

        let calls = external_call_blocks(function.blocks);
        if calls.is_empty() {
            return None;
        }
        let writes = state_write_blocks(function.blocks, state_vars);

        for (call_index, callee) in &calls {
            let later = match self.mode {
                DetectionMode::Ordered => writes.iter().find(|(w, _)| w > call_index),
                DetectionMode::Reachability => {
                    let reached = reachable_from(function.blocks, *call_index);
                    writes.iter().find(|(w, _)| reached.contains(w))
                }
            };
            if let Some((write_index, var)) = later {
                let description = format!(
                    "External call `{}` in {} is followed by a write to state variable `{}` in {}",
                    callee, function.blocks[*call_index].id, var, function.blocks[*write_index].id
                );
                debug!(
                    contract = function.contract,
                    function = function.name,
                    callee = callee.as_str(),
                    var = var.as_str(),
                    "reentrancy"
                );
                return Some(Finding::reentrancy(function.contract, function.name, description));
            }
        }
        None
    }
}

pub fn is_reentrancy_guard(modifier: &str) -> bool {
    let lower = modifier.to_ascii_lowercase();
    GUARD_PATTERNS.iter().any(|p| lower.contains(p))
}

/// (block index, first external callee) per block with an external call
fn external_call_blocks(blocks: &[SsaBlock]) -> Vec<(usize, String)> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            block.calls().find_map(|call| match call {
                Instruction::Call {
                    callee, call_type, ..
                } if call_type.is_external() => Some((i, callee.clone())),
                _ => None,
            })
        })
        .collect()
}

/// (block index, state variable) per block writing state
fn state_write_blocks(blocks: &[SsaBlock], state_vars: &BTreeSet<String>) -> Vec<(usize, String)> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(i, block)| {
            block.instructions.iter().find_map(|instruction| match instruction {
                Instruction::Assign { dest, .. } => {
                    let base = base_name(&dest.name);
                    state_vars.contains(base).then(|| (i, base.to_string()))
                }
                _ => None,
            })
        })
        .collect()
}
