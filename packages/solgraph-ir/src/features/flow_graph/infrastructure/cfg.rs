/*
 * Control-Flow Refiner and CFG queries
 *
 * Refinement replaces a block ending in if/for/while with a fixed shape:
 *   if:    cond -> true | false -> next
 *   for:   init -> header -> body -> increment -> header | exit -> next
 *   while: init -> header -> body -> header | exit -> next
 *
 * Branch and loop bodies are not refined again; nested control flow is
 * handled statement-wise by the access tracker and SSA lowering.
 */

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde_json::json;
use tracing::trace;

use crate::features::flow_graph::domain::{
    closing_terminator, BasicBlock, BlockIdAllocator, BranchSide, LoopRole, Terminator,
};
use crate::features::parsing::domain::{StatementKind, TypedStatement};
use crate::features::parsing::infrastructure::{classify_statement, classify_statements};
use crate::features::ssa::domain::SsaBlock;
use crate::shared::models::{AstNode, NodeRef};

/// Anything with an id and a terminator can be walked as a CFG
pub trait FlowBlock {
    fn block_id(&self) -> &str;
    fn block_terminator(&self) -> &Terminator;
}

impl FlowBlock for BasicBlock {
    fn block_id(&self) -> &str {
        &self.id
    }
    fn block_terminator(&self) -> &Terminator {
        &self.terminator
    }
}

impl FlowBlock for SsaBlock {
    fn block_id(&self) -> &str {
        &self.id
    }
    fn block_terminator(&self) -> &Terminator {
        &self.terminator
    }
}

pub fn refine_blocks(blocks: Vec<BasicBlock>, ids: &mut BlockIdAllocator) -> Vec<BasicBlock> {
    let mut refined = Vec::with_capacity(blocks.len());
    for block in blocks {
        let kind = block.last_statement().map(|s| s.kind);
        match kind {
            Some(StatementKind::IfStatement) => refined.extend(refine_if(block, ids)),
            Some(StatementKind::ForLoop) => refined.extend(refine_loop(block, ids, true)),
            Some(StatementKind::WhileLoop) => refined.extend(refine_loop(block, ids, false)),
            _ => refined.push(block),
        }
    }
    refined
}

/// Successor of the original block, if it had one
fn continuation(block: &BasicBlock) -> Option<String> {
    match &block.terminator {
        Terminator::Goto(next) => Some(next.clone()),
        _ => None,
    }
}

fn body_block(id: String, body: Option<NodeRef<'_>>, next: Terminator) -> BasicBlock {
    let statements = body
        .map(|b| classify_statements(b.body_statements()))
        .unwrap_or_default();
    let terminator = closing_terminator(&statements, next);
    BasicBlock::new(id)
        .with_statements(statements)
        .with_terminator(terminator)
}

fn condition_of(node: NodeRef<'_>) -> AstNode {
    match node.child("condition") {
        Some(cond) => cond.to_owned_node(),
        // for (;;)
        None => AstNode::new(json!({"nodeType": "Literal", "kind": "bool", "value": "true"})),
    }
}

fn refine_if(mut block: BasicBlock, ids: &mut BlockIdAllocator) -> Vec<BasicBlock> {
    let next = continuation(&block);
    let if_node = match block.last_statement() {
        Some(s) => s.node.clone(),
        None => return vec![block],
    };
    let view = if_node.view();

    let then_id = ids.next_id();
    let else_id = ids.next_id();
    let fallthrough = Terminator::goto_or_pending(next.as_deref());

    let true_block = body_block(then_id.clone(), view.child("trueBody"), fallthrough.clone())
        .with_side(BranchSide::True);
    let false_block = body_block(else_id.clone(), view.child("falseBody"), fallthrough)
        .with_side(BranchSide::False);

    trace!(cond = %block.id, %then_id, %else_id, "refined if");
    block.terminator = Terminator::Branch {
        condition: condition_of(view),
        then_id,
        else_id,
    };
    vec![block, true_block, false_block]
}

fn refine_loop(mut block: BasicBlock, ids: &mut BlockIdAllocator, is_for: bool) -> Vec<BasicBlock> {
    let next = continuation(&block);
    let loop_stmt = match block.statements.pop() {
        Some(s) => s,
        None => return vec![block],
    };
    let view = loop_stmt.view();

    let header_id = ids.next_id();
    let body_id = ids.next_id();
    let increment_id = if is_for { Some(ids.next_id()) } else { None };
    let exit_id = ids.next_id();

    // init: statements before the loop plus the initializer
    if is_for {
        if let Some(init) = view.child("initializationExpression") {
            block
                .statements
                .push(TypedStatement::new(classify_statement(init), init.to_owned_node()));
        }
    }
    block.role = Some(LoopRole::Init);
    block.terminator = Terminator::Goto(header_id.clone());

    let body_next = Terminator::Goto(increment_id.clone().unwrap_or_else(|| header_id.clone()));
    let body = body_block(body_id.clone(), view.child("body"), body_next).with_role(LoopRole::Body);

    let condition = condition_of(view);
    let header = BasicBlock::new(header_id.clone())
        .with_statements(vec![loop_stmt.clone()])
        .with_role(LoopRole::Header)
        .with_terminator(Terminator::Branch {
            condition,
            then_id: body_id,
            else_id: exit_id.clone(),
        });

    let exit = BasicBlock::new(exit_id)
        .with_role(LoopRole::Exit)
        .with_terminator(Terminator::goto_or_pending(next.as_deref()));

    trace!(init = %block.id, header = %header_id, "refined loop");
    let mut out = vec![block, header, body];
    if let Some(increment_id) = increment_id {
        let statements = view
            .child("loopExpression")
            .map(|e| vec![TypedStatement::new(classify_statement(e), e.to_owned_node())])
            .unwrap_or_default();
        out.push(
            BasicBlock::new(increment_id)
                .with_statements(statements)
                .with_role(LoopRole::Increment)
                .with_terminator(Terminator::Goto(header_id)),
        );
    }
    out.push(exit);
    out
}

/// Replace every remaining `Pending` with `Return`
pub fn finalize_blocks(blocks: &mut [BasicBlock]) {
    for block in blocks.iter_mut() {
        if block.terminator.is_pending() {
            block.terminator = Terminator::Return;
        }
    }
}

fn index_of<B: FlowBlock>(blocks: &[B]) -> HashMap<&str, usize> {
    blocks
        .iter()
        .enumerate()
        .map(|(i, b)| (b.block_id(), i))
        .collect()
}

/// Successor indices; `Pending` falls through to the next block in order
pub fn successors<B: FlowBlock>(blocks: &[B], index: usize) -> Vec<usize> {
    let positions = index_of(blocks);
    successors_with(blocks, &positions, index)
}

fn successors_with<B: FlowBlock>(
    blocks: &[B],
    positions: &HashMap<&str, usize>,
    index: usize,
) -> Vec<usize> {
    let terminator = blocks[index].block_terminator();
    if terminator.is_pending() {
        return if index + 1 < blocks.len() {
            vec![index + 1]
        } else {
            Vec::new()
        };
    }
    let mut out: Vec<usize> = Vec::new();
    for target in terminator.targets() {
        if let Some(&i) = positions.get(target) {
            if !out.contains(&i) {
                out.push(i);
            }
        }
    }
    out
}

/// Block id -> predecessor ids, predecessors in block order
pub fn predecessor_map<B: FlowBlock>(blocks: &[B]) -> BTreeMap<String, Vec<String>> {
    let positions = index_of(blocks);
    let mut preds: BTreeMap<String, Vec<String>> = blocks
        .iter()
        .map(|b| (b.block_id().to_string(), Vec::new()))
        .collect();
    for i in 0..blocks.len() {
        for succ in successors_with(blocks, &positions, i) {
            let entry = preds.entry(blocks[succ].block_id().to_string()).or_default();
            let source = blocks[i].block_id().to_string();
            if !entry.contains(&source) {
                entry.push(source);
            }
        }
    }
    preds
}

/// `(source, target)` indices of `Goto`s that jump to an earlier (or the same) block
pub fn back_edges<B: FlowBlock>(blocks: &[B]) -> Vec<(usize, usize)> {
    let positions = index_of(blocks);
    let mut edges = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        if let Terminator::Goto(target) = block.block_terminator() {
            if let Some(&t) = positions.get(target.as_str()) {
                if t <= i {
                    edges.push((i, t));
                }
            }
        }
    }
    edges
}

pub fn loop_headers<B: FlowBlock>(blocks: &[B]) -> BTreeSet<usize> {
    back_edges(blocks).into_iter().map(|(_, t)| t).collect()
}

/// petgraph view of the block list; node weights are block ids
pub fn to_graph<B: FlowBlock>(blocks: &[B]) -> (DiGraph<String, ()>, Vec<NodeIndex>) {
    let mut graph = DiGraph::new();
    let nodes: Vec<NodeIndex> = blocks
        .iter()
        .map(|b| graph.add_node(b.block_id().to_string()))
        .collect();
    let positions = index_of(blocks);
    for i in 0..blocks.len() {
        for succ in successors_with(blocks, &positions, i) {
            graph.add_edge(nodes[i], nodes[succ], ());
        }
    }
    (graph, nodes)
}

/// Indices reachable from `start` along at least one edge
pub fn reachable_from<B: FlowBlock>(blocks: &[B], start: usize) -> BTreeSet<usize> {
    let (graph, nodes) = to_graph(blocks);
    let position: HashMap<NodeIndex, usize> =
        nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let mut reached = BTreeSet::new();
    for succ in graph.neighbors(nodes[start]) {
        let mut dfs = Dfs::new(&graph, succ);
        while let Some(node) = dfs.next(&graph) {
            if let Some(&i) = position.get(&node) {
                reached.insert(i);
            }
        }
    }
    reached
}
