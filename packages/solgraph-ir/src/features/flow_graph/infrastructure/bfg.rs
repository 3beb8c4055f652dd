/*
 * Basic Block Builder
 *
 * Splits a flat statement sequence into blocks:
 * - if / for / while / return / emit always end the current block
 * - calls, assignments and declarations end it unless they are last
 *
 * Effects therefore sit at the end of their block, which is what lets the
 * reentrancy check order them at block granularity.
 */

use crate::features::flow_graph::domain::{
    closing_terminator, BasicBlock, BlockIdAllocator, Terminator,
};
use crate::features::parsing::domain::TypedStatement;

pub struct BlockBuilder<'a> {
    ids: &'a mut BlockIdAllocator,
    blocks: Vec<BasicBlock>,
    current: Vec<TypedStatement>,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(ids: &'a mut BlockIdAllocator) -> Self {
        Self {
            ids,
            blocks: Vec::new(),
            current: Vec::new(),
        }
    }

    pub fn build(mut self, statements: Vec<TypedStatement>) -> Vec<BasicBlock> {
        let total = statements.len();
        for (i, statement) in statements.into_iter().enumerate() {
            let is_last = i + 1 == total;
            let kind = statement.kind;
            self.current.push(statement);
            if kind.always_splits() || (kind.is_effectful() && !is_last) {
                self.flush_current_block();
            }
        }
        // Trailing empty block is dropped by flush
        self.flush_current_block();
        self.link();
        self.blocks
    }

    fn flush_current_block(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let statements = std::mem::take(&mut self.current);
        let block = BasicBlock::new(self.ids.next_id()).with_statements(statements);
        self.blocks.push(block);
    }

    /// Sequential `Goto`s; the last block stays `Pending` unless it returns
    fn link(&mut self) {
        let next_ids: Vec<Option<String>> = (0..self.blocks.len())
            .map(|i| self.blocks.get(i + 1).map(|b| b.id.clone()))
            .collect();
        for (block, next) in self.blocks.iter_mut().zip(next_ids) {
            let fallthrough = Terminator::goto_or_pending(next.as_deref());
            block.terminator = closing_terminator(&block.statements, fallthrough);
        }
    }
}

/// Split `statements` into basic blocks, drawing ids from `ids`
pub fn build_blocks(statements: Vec<TypedStatement>, ids: &mut BlockIdAllocator) -> Vec<BasicBlock> {
    BlockBuilder::new(ids).build(statements)
}
