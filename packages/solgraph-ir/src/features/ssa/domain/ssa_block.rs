//! SSA-level block model
use std::collections::BTreeMap;

use serde::Serialize;

use super::Instruction;
use crate::features::data_flow::domain::AccessSet;
use crate::features::flow_graph::domain::Terminator;

/// Entry/exit versions recorded per block by the versioning pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SsaVersions {
    /// Version each read observes
    pub reads: BTreeMap<String, u32>,
    /// Last version written in the block
    pub writes: BTreeMap<String, u32>,
}

/// Finished SSA block: id, instructions, terminator and accesses only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SsaBlock {
    pub id: String,
    #[serde(rename = "statements")]
    pub instructions: Vec<Instruction>,
    pub terminator: Terminator,
    pub accesses: AccessSet,
}

impl SsaBlock {
    pub fn calls(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions
            .iter()
            .filter(|i| matches!(i, Instruction::Call { .. }))
    }
}
