/*
 * Access Tracker
 *
 * Computes per-statement and per-block read/write sets:
 * - locations record their whole access path (base, intermediate composites, full name)
 * - index expressions, call arguments and member-call receivers are reads
 * - callee identifiers are not variables and are dropped
 * - a refined if/loop head only contributes its condition (plus loop counters)
 */

use crate::features::data_flow::domain::AccessSet;
use crate::features::data_flow::infrastructure::composite::{access_path, is_location, loop_counters};
use crate::features::flow_graph::domain::BasicBlock;
use crate::features::parsing::infrastructure::expression_text;
use crate::shared::models::{NodeRef, NodeType};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Read,
    Write,
}

/// Attach an `AccessSet` to every block
pub fn track_blocks(blocks: &mut [BasicBlock]) {
    for block in blocks.iter_mut() {
        block.accesses = block_accesses(block);
    }
}

pub fn block_accesses(block: &BasicBlock) -> AccessSet {
    let mut acc = AccessSet::new();
    for (i, statement) in block.statements.iter().enumerate() {
        let head_only = block.is_refined_head(i);
        acc.union_with(&statement_accesses(statement.view(), head_only));
    }
    acc
}

/// Accesses of one statement. With `head_only`, an `if`/loop contributes only
/// its condition and the loop-counter idioms of its body.
pub fn statement_accesses(node: NodeRef<'_>, head_only: bool) -> AccessSet {
    let mut tracker = AccessTracker::default();
    tracker.statement(node, head_only);
    tracker.acc
}

#[derive(Default)]
pub struct AccessTracker {
    pub acc: AccessSet,
}

impl AccessTracker {
    fn record(&mut self, name: String, mode: Mode) {
        match mode {
            Mode::Read => self.acc.read(name),
            Mode::Write => self.acc.write(name),
        }
    }

    pub fn statement(&mut self, node: NodeRef<'_>, head_only: bool) {
        match node.node_type() {
            NodeType::ExpressionStatement => self.child_expr(node, "expression"),
            NodeType::VariableDeclarationStatement => {
                for decl in node.children("declarations") {
                    self.acc.write(decl.name());
                }
                self.child_expr(node, "initialValue");
            }
            NodeType::EmitStatement => {
                if let Some(call) = node.child("eventCall") {
                    self.emit(call);
                }
            }
            NodeType::RevertStatement => {
                if let Some(call) = node.child("errorCall") {
                    self.arguments(call);
                }
            }
            NodeType::Return => self.child_expr(node, "expression"),
            NodeType::IfStatement => {
                self.child_expr(node, "condition");
                if !head_only {
                    self.body(node.child("trueBody"));
                    self.body(node.child("falseBody"));
                }
            }
            NodeType::ForStatement => {
                self.child_expr(node, "condition");
                if head_only {
                    self.counters(node);
                } else {
                    if let Some(init) = node.child("initializationExpression") {
                        self.statement(init, false);
                    }
                    if let Some(step) = node.child("loopExpression") {
                        self.statement(step, false);
                    }
                    self.body(node.child("body"));
                }
            }
            NodeType::WhileStatement | NodeType::DoWhileStatement => {
                self.child_expr(node, "condition");
                if head_only {
                    self.counters(node);
                } else {
                    self.body(node.child("body"));
                }
            }
            NodeType::Block | NodeType::UncheckedBlock => self.body(Some(node)),
            NodeType::TryStatement => {
                self.child_expr(node, "externalCall");
                for clause in node.children("clauses") {
                    if let Some(params) = clause.child("parameters") {
                        for p in params.children("parameters") {
                            self.acc.write(p.name());
                        }
                    }
                    self.body(clause.child("block"));
                }
            }
            _ => {}
        }
    }

    fn body(&mut self, body: Option<NodeRef<'_>>) {
        if let Some(body) = body {
            for statement in body.body_statements() {
                self.statement(statement, false);
            }
        }
    }

    /// Counter idioms in a loop body are folded into the header as reads
    fn counters(&mut self, loop_node: NodeRef<'_>) {
        if let Some(body) = loop_node.child("body") {
            for name in loop_counters(body) {
                self.acc.read(name);
            }
        }
    }

    fn child_expr(&mut self, node: NodeRef<'_>, key: &str) {
        if let Some(expr) = node.child(key) {
            self.expr(expr);
        }
    }

    fn arguments(&mut self, call: NodeRef<'_>) {
        for arg in call.children("arguments") {
            self.expr(arg);
        }
    }

    fn emit(&mut self, call: NodeRef<'_>) {
        self.arguments(call);
        let event = call.child("expression").map(expression_text).unwrap_or_default();
        if event != "Transfer" {
            return;
        }
        let args = call.children("arguments");
        if args.len() < 3 {
            return;
        }
        let is_zero = |n: NodeRef<'_>| expression_text(n) == "address(0)";
        if is_zero(args[0]) {
            // mint: to, amount
            self.acc.read(expression_text(args[1]));
            self.acc.read(expression_text(args[2]));
        } else if is_zero(args[1]) {
            // burn: from, amount
            self.acc.read(expression_text(args[0]));
            self.acc.read(expression_text(args[2]));
        }
    }

    /// Record a location's access path; index expressions and
    /// non-location bases are visited as reads
    fn location(&mut self, node: NodeRef<'_>, mode: Mode) {
        match node.node_type() {
            NodeType::TupleExpression => {
                for component in node.children("components") {
                    self.location(component, mode);
                }
            }
            NodeType::Identifier | NodeType::MemberAccess | NodeType::IndexAccess
                if is_location(node) =>
            {
                for name in access_path(node) {
                    self.record(name, mode);
                }
                self.index_reads(node);
            }
            _ => self.expr(node),
        }
    }

    fn index_reads(&mut self, node: NodeRef<'_>) {
        match node.node_type() {
            NodeType::IndexAccess => {
                self.child_expr(node, "indexExpression");
                if let Some(base) = node.child("baseExpression") {
                    self.index_reads(base);
                }
            }
            NodeType::MemberAccess => {
                if let Some(base) = node.child("expression") {
                    self.index_reads(base);
                }
            }
            _ => {}
        }
    }

    pub fn expr(&mut self, node: NodeRef<'_>) {
        match node.node_type() {
            NodeType::Identifier | NodeType::MemberAccess | NodeType::IndexAccess
                if is_location(node) =>
            {
                self.location(node, Mode::Read)
            }
            NodeType::MemberAccess => self.child_expr(node, "expression"),
            NodeType::IndexAccess => {
                self.child_expr(node, "baseExpression");
                self.child_expr(node, "indexExpression");
            }
            NodeType::IndexRangeAccess => {
                self.child_expr(node, "baseExpression");
                self.child_expr(node, "startExpression");
                self.child_expr(node, "endExpression");
            }
            NodeType::Assignment => {
                if let Some(lhs) = node.child("leftHandSide") {
                    self.location(lhs, Mode::Write);
                    if node.str_field("operator") != "=" {
                        self.location(lhs, Mode::Read);
                    }
                }
                self.child_expr(node, "rightHandSide");
            }
            NodeType::UnaryOperation => {
                let op = node.str_field("operator");
                match node.child("subExpression") {
                    Some(sub) if matches!(op, "++" | "--") => {
                        self.location(sub, Mode::Read);
                        self.location(sub, Mode::Write);
                    }
                    Some(sub) if op == "delete" => self.location(sub, Mode::Write),
                    Some(sub) => self.expr(sub),
                    None => {}
                }
            }
            NodeType::BinaryOperation => {
                self.child_expr(node, "leftExpression");
                self.child_expr(node, "rightExpression");
            }
            NodeType::Conditional => {
                self.child_expr(node, "condition");
                self.child_expr(node, "trueExpression");
                self.child_expr(node, "falseExpression");
            }
            NodeType::TupleExpression => {
                for component in node.children("components") {
                    self.expr(component);
                }
            }
            NodeType::FunctionCall => {
                if let Some(callee) = node.child("expression") {
                    self.callee(callee);
                }
                self.arguments(node);
            }
            NodeType::FunctionCallOptions => self.callee(node),
            _ => {}
        }
    }

    /// Callee identifiers are functions, not variables; receivers and
    /// call options are reads
    fn callee(&mut self, callee: NodeRef<'_>) {
        match callee.node_type() {
            NodeType::MemberAccess => self.child_expr(callee, "expression"),
            NodeType::FunctionCallOptions => {
                for option in callee.children("options") {
                    self.expr(option);
                }
                if let Some(inner) = callee.child("expression") {
                    self.callee(inner);
                }
            }
            NodeType::Identifier | NodeType::ElementaryTypeNameExpression | NodeType::NewExpression => {}
            _ => self.expr(callee),
        }
    }
}
