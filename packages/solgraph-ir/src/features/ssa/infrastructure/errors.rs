/*
 * SSA Error Types
 *
 * Internal invariants of the finished block list. These are logic errors,
 * never input-shape problems: debug builds panic, release builds log and
 * keep the result.
 */

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::features::flow_graph::domain::Terminator;
use crate::features::flow_graph::infrastructure::predecessor_map;
use crate::features::ssa::domain::SsaBlock;

#[derive(Debug, Clone, PartialEq)]
pub enum SsaError {
    /// A `Pending` terminator survived finalization
    PendingTerminator { block_id: String },

    /// Phi in a block nothing jumps to
    PhiWithoutPredecessors { block_id: String },

    /// Two blocks share an id
    DuplicateBlockId { block_id: String },

    /// Terminator names a block that does not exist
    DanglingTarget { block_id: String, target: String },
}

impl fmt::Display for SsaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsaError::PendingTerminator { block_id } => {
                write!(f, "Pending terminator in block '{}'", block_id)
            }
            SsaError::PhiWithoutPredecessors { block_id } => {
                write!(f, "Phi in block '{}' without predecessors", block_id)
            }
            SsaError::DuplicateBlockId { block_id } => {
                write!(f, "Duplicate block id '{}'", block_id)
            }
            SsaError::DanglingTarget { block_id, target } => {
                write!(f, "Block '{}' jumps to unknown block '{}'", block_id, target)
            }
        }
    }
}

impl std::error::Error for SsaError {}

/// Result type for SSA operations
pub type SsaResult<T> = Result<T, SsaError>;

/// Check the structural invariants of a finished SSA block list
pub fn validate_blocks(blocks: &[SsaBlock]) -> SsaResult<()> {
    let mut seen = HashSet::new();
    for block in blocks {
        if !seen.insert(block.id.as_str()) {
            return Err(SsaError::DuplicateBlockId {
                block_id: block.id.clone(),
            });
        }
    }

    let preds = predecessor_map(blocks);
    for block in blocks {
        if block.terminator == Terminator::Pending {
            return Err(SsaError::PendingTerminator {
                block_id: block.id.clone(),
            });
        }
        for target in block.terminator.targets() {
            if !seen.contains(target) {
                return Err(SsaError::DanglingTarget {
                    block_id: block.id.clone(),
                    target: target.to_string(),
                });
            }
        }
        let has_phi = block.instructions.iter().any(|i| i.is_phi());
        if has_phi && preds.get(&block.id).map_or(true, |p| p.is_empty()) {
            return Err(SsaError::PhiWithoutPredecessors {
                block_id: block.id.clone(),
            });
        }
    }
    Ok(())
}

/// Debug builds fail loudly; release builds warn and continue
pub fn enforce(result: SsaResult<()>, function: &str) {
    if let Err(e) = result {
        debug_assert!(false, "SSA invariant violated in {}: {}", function, e);
        warn!(function, error = %e, "SSA invariant violated, keeping result");
    }
}
