/*
 * IR-level block splitting
 *
 * Same boundary rule as the statement-level builder: a Call, Assign, Emit
 * or Return that is not the last instruction ends its block. Runs on
 * instructions directly, so inlined code gets split without re-parsing.
 *
 * The first piece keeps the original id (so jump targets stay valid), the
 * last piece inherits the original terminator, and phi sources are pointed
 * at the last piece of each predecessor.
 */

use std::collections::HashMap;

use crate::features::data_flow::domain::{base_name, AccessSet};
use crate::features::flow_graph::domain::{BasicBlock, BlockIdAllocator, Terminator};
use crate::features::ssa::domain::{Instruction, SsaBlock};

pub fn split_blocks(blocks: &[BasicBlock], ids: &mut BlockIdAllocator) -> Vec<SsaBlock> {
    let mut out = Vec::new();
    let mut last_piece: HashMap<String, String> = HashMap::new();

    for block in blocks {
        let groups = group_instructions(&block.instructions);
        let count = groups.len();
        let piece_ids: Vec<String> = (0..count)
            .map(|i| if i == 0 { block.id.clone() } else { ids.next_id() })
            .collect();

        for (i, instructions) in groups.into_iter().enumerate() {
            let terminator = if i + 1 == count {
                block.terminator.clone()
            } else {
                Terminator::Goto(piece_ids[i + 1].clone())
            };
            let accesses = instruction_accesses(&instructions);
            out.push(SsaBlock {
                id: piece_ids[i].clone(),
                instructions,
                terminator,
                accesses,
            });
        }
        if let Some(last) = piece_ids.last() {
            last_piece.insert(block.id.clone(), last.clone());
        }
    }

    for block in out.iter_mut() {
        for instruction in block.instructions.iter_mut() {
            if let Instruction::Phi { sources, .. } = instruction {
                for (pred, _) in sources.iter_mut() {
                    if let Some(last) = last_piece.get(pred.as_str()) {
                        *pred = last.clone();
                    }
                }
            }
        }
    }
    out
}

/// Cut after every effectful instruction except the last; never empty
fn group_instructions(instructions: &[Instruction]) -> Vec<Vec<Instruction>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let total = instructions.len();
    for (i, instruction) in instructions.iter().enumerate() {
        current.push(instruction.clone());
        if instruction.is_effectful() && i + 1 < total {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() || groups.is_empty() {
        groups.push(current);
    }
    groups
}

/// Reads/writes derived from instructions: variable names plus their base names
pub fn instruction_accesses(instructions: &[Instruction]) -> AccessSet {
    let mut acc = AccessSet::new();
    for instruction in instructions {
        instruction.for_each_use(&mut |v| {
            acc.read(v.name.clone());
            acc.read(base_name(&v.name).to_string());
        });
        for def in instruction.defs() {
            acc.write(def.name.clone());
            acc.write(base_name(&def.name).to_string());
        }
    }
    acc
}
