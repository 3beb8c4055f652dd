//! Per-function SSA use case
//!
//! classify -> blocks -> refine -> finalize -> accesses -> versioning -> phis,
//! then optional inlining (re-versioning + phis again), split + validate.

use tracing::debug;

use crate::features::data_flow::infrastructure::track_blocks;
use crate::features::flow_graph::domain::{BasicBlock, BlockIdAllocator};
use crate::features::flow_graph::infrastructure::{build_blocks, finalize_blocks, refine_blocks};
use crate::features::interprocedural::domain::CallSite;
use crate::features::interprocedural::infrastructure::call_classifier::CallContext;
use crate::features::interprocedural::infrastructure::Inliner;
use crate::features::parsing::infrastructure::classify_statements;
use crate::features::ssa::domain::SsaBlock;
use crate::features::ssa::infrastructure::{
    enforce, insert_phis, instruction_accesses, split_blocks, validate_blocks, version_blocks,
    SsaBuildContext,
};
use crate::shared::models::NodeRef;

/// One function between phi insertion and IR splitting
#[derive(Debug, Clone)]
pub struct FunctionSsa {
    pub blocks: Vec<BasicBlock>,
    pub calls: Vec<CallSite>,
    pub ctx: SsaBuildContext,
    pub ids: BlockIdAllocator,
}

impl FunctionSsa {
    /// Run every pass up to and including phi insertion
    pub fn build(body: Option<NodeRef<'_>>, calls: &CallContext) -> Self {
        let statements = body
            .map(|b| classify_statements(b.body_statements()))
            .unwrap_or_default();

        let mut ids = BlockIdAllocator::new();
        let blocks = build_blocks(statements, &mut ids);
        let mut blocks = refine_blocks(blocks, &mut ids);
        finalize_blocks(&mut blocks);
        track_blocks(&mut blocks);

        let mut ctx = SsaBuildContext::new();
        let versioning = version_blocks(&mut blocks, &mut ctx, calls);
        let phis = insert_phis(&mut blocks, &versioning.exits, &mut ctx);
        debug!(blocks = blocks.len(), phis, calls = versioning.call_sites.len(), "built SSA");

        Self {
            blocks,
            calls: versioning.call_sites,
            ctx,
            ids,
        }
    }

    /// Splice internal callees, then rebuild phis over the new numbering
    pub fn inline(&mut self, inliner: &Inliner<'_>, root: &str) -> usize {
        let outcome = inliner.inline_blocks(root, &mut self.blocks, &mut self.ctx);
        if outcome.spliced == 0 {
            return 0;
        }
        self.refresh_accesses();
        let phis = insert_phis(&mut self.blocks, &outcome.exits, &mut self.ctx);
        debug!(function = root, spliced = outcome.spliced, phis, "inlined");
        outcome.spliced
    }

    /// Fold instruction-level accesses (inlined code) back into the blocks
    pub fn refresh_accesses(&mut self) {
        for block in self.blocks.iter_mut() {
            let derived = instruction_accesses(&block.instructions);
            block.accesses.union_with(&derived);
        }
    }

    /// Split at IR level and check invariants
    pub fn finish(&mut self, function: &str) -> Vec<SsaBlock> {
        let ssa = split_blocks(&self.blocks, &mut self.ids);
        enforce(validate_blocks(&ssa), function);
        ssa
    }
}
