/*
 * Phi Insertion
 *
 * Runs after versioning. A block gets phis when it has two or more
 * predecessors or is a loop header (target of a back edge).
 *
 * For variable v with reaching writes W (one entry per predecessor that
 * writes v; a back-edge predecessor contributes the latest write in the
 * loop body):
 * - |distinct(W)| > 1                       -> phi
 * - exactly one writer and v read here      -> phi
 * - otherwise                               -> none
 *
 * Non-writing predecessors contribute their exit version. Uses of any
 * merged version inside the block are rewritten to the phi destination.
 */

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::trace;

use crate::features::flow_graph::domain::BasicBlock;
use crate::features::flow_graph::infrastructure::{back_edges, predecessor_map};
use crate::features::ssa::domain::{Instruction, SsaExpr, SsaVar};
use crate::features::ssa::infrastructure::context::SsaBuildContext;

/// Insert phis in place; returns how many were inserted
pub fn insert_phis(
    blocks: &mut [BasicBlock],
    exits: &[BTreeMap<String, u32>],
    ctx: &mut SsaBuildContext,
) -> usize {
    let preds = predecessor_map(&*blocks);
    let back: BTreeSet<(usize, usize)> = back_edges(&*blocks).into_iter().collect();
    let headers: BTreeSet<usize> = back.iter().map(|&(_, target)| target).collect();
    let positions: HashMap<String, usize> = blocks
        .iter()
        .enumerate()
        .map(|(i, b)| (b.id.clone(), i))
        .collect();

    let mut inserted = 0;
    for index in 0..blocks.len() {
        let pred_ids = preds.get(&blocks[index].id).cloned().unwrap_or_default();
        if pred_ids.is_empty() || (pred_ids.len() < 2 && !headers.contains(&index)) {
            continue;
        }

        // (pred id, pred index, writes reaching along that edge)
        let reaching: Vec<(String, usize, BTreeMap<String, u32>)> = pred_ids
            .iter()
            .filter_map(|id| positions.get(id).map(|&p| (id.clone(), p)))
            .map(|(id, p)| {
                let writes = if back.contains(&(p, index)) {
                    loop_writes(blocks, index, p)
                } else {
                    blocks[p].ssa_versions.writes.clone()
                };
                (id, p, writes)
            })
            .collect();

        let candidates: BTreeSet<&String> = reaching.iter().flat_map(|(_, _, w)| w.keys()).collect();
        let mut phis = Vec::new();
        let mut merges: Vec<(String, BTreeSet<u32>, SsaVar)> = Vec::new();

        for var in candidates {
            let written: Vec<u32> = reaching
                .iter()
                .filter_map(|(_, _, w)| w.get(var).copied())
                .collect();
            let distinct: BTreeSet<u32> = written.iter().copied().collect();
            let read_here = blocks[index].accesses.reads.contains(var);
            if !(distinct.len() > 1 || (written.len() == 1 && read_here)) {
                continue;
            }

            let sources: Vec<(String, SsaVar)> = reaching
                .iter()
                .map(|(id, p, w)| {
                    let version = w
                        .get(var)
                        .copied()
                        .or_else(|| exits.get(*p).and_then(|e| e.get(var).copied()))
                        .unwrap_or(0);
                    (id.clone(), SsaVar::new(var.as_str(), version))
                })
                .collect();
            let merged: BTreeSet<u32> = sources.iter().map(|(_, v)| v.version).collect();
            let dest = SsaVar::new(var.as_str(), ctx.allocate(var));

            trace!(block = %blocks[index].id, phi = %dest, "inserted phi");
            merges.push((var.clone(), merged, dest.clone()));
            phis.push(Instruction::Phi { dest, sources });
        }

        if phis.is_empty() {
            continue;
        }
        inserted += phis.len();

        let block = &mut blocks[index];
        for (var, merged, dest) in &merges {
            for instruction in block.instructions.iter_mut() {
                instruction.substitute_uses(&mut |v| {
                    (v.name == *var && merged.contains(&v.version)).then(|| SsaExpr::Var(dest.clone()))
                });
            }
            if let Some(read) = block.ssa_versions.reads.get_mut(var) {
                *read = dest.version;
            }
        }
        phis.extend(std::mem::take(&mut block.instructions));
        block.instructions = phis;
    }
    inserted
}

/// Latest write per variable over the loop from `header + 1` to `source`
fn loop_writes(blocks: &[BasicBlock], header: usize, source: usize) -> BTreeMap<String, u32> {
    let mut writes: BTreeMap<String, u32> = BTreeMap::new();
    for block in &blocks[header + 1..=source] {
        for (name, &version) in &block.ssa_versions.writes {
            let entry = writes.entry(name.clone()).or_insert(version);
            *entry = (*entry).max(version);
        }
    }
    writes
}
