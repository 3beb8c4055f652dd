mod instruction;
mod ssa_block;

pub use instruction::{Instruction, SsaExpr, SsaVar};
pub use ssa_block::{SsaBlock, SsaVersions};
