/*
 * SSA Lowering (versioning pass)
 *
 * Lowers each block's statements to `Instruction`s while assigning
 * versions in block order:
 * - reads see the current version, every write takes counter + 1
 * - nested calls are hoisted into `retN = call[kind](..)` instructions
 * - a refined if/loop head lowers to its condition only; nested control
 *   flow is flattened (condition, then both bodies)
 *
 * Records per-block entry/exit versions for the phi pass.
 */

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::trace;

use crate::features::data_flow::infrastructure::{access_path, composite_name, is_location};
use crate::features::flow_graph::domain::BasicBlock;
use crate::features::flow_graph::infrastructure::predecessor_map;
use crate::features::interprocedural::domain::{CallSite, CallType};
use crate::features::interprocedural::infrastructure::call_classifier::{
    call_name, callee_of, classify_call, is_struct_constructor, is_type_conversion, CallContext,
};
use crate::features::parsing::domain::StatementKind;
use crate::features::parsing::infrastructure::{expression_text, statement_text};
use crate::features::ssa::domain::{Instruction, SsaExpr, SsaVar, SsaVersions};
use crate::features::ssa::infrastructure::context::SsaBuildContext;
use crate::shared::models::{NodeRef, NodeType};

/// Receivers that name a namespace rather than a variable
const NAMESPACE_RECEIVERS: [&str; 3] = ["abi", "super", "this"];

/// Output of the versioning pass besides the blocks themselves
#[derive(Debug, Clone, Default)]
pub struct VersioningResult {
    /// Current versions after each block, indexed like the blocks
    pub exits: Vec<BTreeMap<String, u32>>,
    pub call_sites: Vec<CallSite>,
}

/// Lower and version every block in order.
///
/// Versioning is linear over the block list, except that an if-arm starts
/// from its condition block's exit state so one arm never observes the
/// other's writes. After an arm the context resumes at the latest version
/// of every variable.
pub fn version_blocks(
    blocks: &mut [BasicBlock],
    ctx: &mut SsaBuildContext,
    calls: &CallContext,
) -> VersioningResult {
    for block in blocks.iter() {
        for name in block.accesses.names() {
            ctx.seed(name);
        }
    }
    let preds = predecessor_map(&*blocks);
    let positions: HashMap<String, usize> = blocks
        .iter()
        .enumerate()
        .map(|(i, b)| (b.id.clone(), i))
        .collect();

    let mut result = VersioningResult::default();
    for index in 0..blocks.len() {
        let block = &mut blocks[index];

        let arm_entry = match (block.branch_side, preds.get(&block.id)) {
            (Some(_), Some(p)) if p.len() == 1 => positions
                .get(&p[0])
                .and_then(|&cond| result.exits.get(cond))
                .cloned(),
            _ => None,
        };
        let resume = arm_entry.map(|entry| std::mem::replace(&mut ctx.current_version, entry));

        let entry = ctx.snapshot();
        let mut lowerer = Lowerer::new(ctx, calls);
        for (i, statement) in block.statements.iter().enumerate() {
            lowerer.statement(statement.view(), block.is_refined_head(i));
        }
        let (instructions, call_sites, defined) = lowerer.finish();

        let has_if = block.contains_kind(StatementKind::IfStatement);
        let mut versions = SsaVersions::default();
        for name in &block.accesses.reads {
            let version = if has_if && defined.contains(name) {
                ctx.current(name)
            } else {
                entry.get(name).copied().unwrap_or(0)
            };
            versions.reads.insert(name.clone(), version);
        }
        for name in &defined {
            versions.writes.insert(name.clone(), ctx.current(name));
        }

        trace!(block = %block.id, instructions = instructions.len(), "versioned block");
        block.instructions = instructions;
        block.ssa_versions = versions;
        result.exits.push(ctx.snapshot());
        result.call_sites.extend(call_sites);

        if let Some(previous) = resume {
            for (name, version) in previous {
                if version > ctx.current(&name) {
                    ctx.set_current(&name, version);
                }
            }
        }
    }
    result
}

/// Statement-to-instruction lowering over a shared version context
pub struct Lowerer<'a> {
    ctx: &'a mut SsaBuildContext,
    calls: &'a CallContext,
    out: Vec<Instruction>,
    call_sites: Vec<CallSite>,
    defined: BTreeSet<String>,
}

impl<'a> Lowerer<'a> {
    pub fn new(ctx: &'a mut SsaBuildContext, calls: &'a CallContext) -> Self {
        Self {
            ctx,
            calls,
            out: Vec::new(),
            call_sites: Vec::new(),
            defined: BTreeSet::new(),
        }
    }

    pub fn finish(self) -> (Vec<Instruction>, Vec<CallSite>, BTreeSet<String>) {
        (self.out, self.call_sites, self.defined)
    }

    fn push(&mut self, instruction: Instruction) {
        self.out.push(instruction);
    }

    fn define(&mut self, name: &str) -> SsaVar {
        self.defined.insert(name.to_string());
        self.ctx.define(name)
    }

    pub fn statement(&mut self, node: NodeRef<'_>, head_only: bool) {
        match node.node_type() {
            NodeType::ExpressionStatement => {
                if let Some(expr) = node.child("expression") {
                    self.expression_statement(expr);
                }
            }
            NodeType::VariableDeclarationStatement => self.declaration(node),
            NodeType::EmitStatement => {
                if let Some(call) = node.child("eventCall") {
                    let event = call.child("expression").map(expression_text).unwrap_or_default();
                    let args = self.arguments(call);
                    self.push(Instruction::Emit { event, args });
                }
            }
            NodeType::RevertStatement => {
                if let Some(call) = node.child("errorCall") {
                    self.revert_statement(call);
                }
            }
            NodeType::Return => {
                let values = match node.child("expression") {
                    Some(expr) => match self.expr(expr) {
                        SsaExpr::Tuple(items) => items,
                        value => vec![value],
                    },
                    None => Vec::new(),
                };
                self.push(Instruction::Return(values));
            }
            NodeType::IfStatement => {
                let cond = self.condition(node);
                self.push(Instruction::Condition(cond));
                if !head_only {
                    self.body(node.child("trueBody"));
                    self.body(node.child("falseBody"));
                }
            }
            NodeType::ForStatement => {
                if head_only {
                    let cond = self.condition(node);
                    self.push(Instruction::Condition(cond));
                } else {
                    if let Some(init) = node.child("initializationExpression") {
                        self.statement(init, false);
                    }
                    let cond = self.condition(node);
                    self.push(Instruction::Condition(cond));
                    self.body(node.child("body"));
                    if let Some(step) = node.child("loopExpression") {
                        self.statement(step, false);
                    }
                }
            }
            NodeType::WhileStatement => {
                let cond = self.condition(node);
                self.push(Instruction::Condition(cond));
                if !head_only {
                    self.body(node.child("body"));
                }
            }
            NodeType::DoWhileStatement => {
                self.body(node.child("body"));
                let cond = self.condition(node);
                self.push(Instruction::Condition(cond));
            }
            NodeType::Block | NodeType::UncheckedBlock => self.body(Some(node)),
            NodeType::TryStatement => self.try_statement(node),
            _ => {
                let text = statement_text(node);
                if !text.is_empty() {
                    self.push(Instruction::Opaque(text));
                }
            }
        }
    }

    fn body(&mut self, body: Option<NodeRef<'_>>) {
        if let Some(body) = body {
            for statement in body.body_statements() {
                self.statement(statement, false);
            }
        }
    }

    fn condition(&mut self, node: NodeRef<'_>) -> SsaExpr {
        match node.child("condition") {
            Some(cond) => self.expr(cond),
            None => SsaExpr::Literal("true".to_string()),
        }
    }

    fn expression_statement(&mut self, expr: NodeRef<'_>) {
        match expr.node_type() {
            NodeType::Assignment => {
                self.assignment(expr);
            }
            NodeType::FunctionCall if !is_type_conversion(expr) && !is_struct_constructor(expr) => {
                self.call(expr);
            }
            NodeType::UnaryOperation
                if matches!(expr.str_field("operator"), "++" | "--" | "delete") =>
            {
                self.expr(expr);
            }
            _ => {
                let value = self.expr(expr);
                self.push(Instruction::Expression(value));
            }
        }
    }

    fn declaration(&mut self, node: NodeRef<'_>) {
        let decls = node.items_of("declarations");
        let value = node.child("initialValue").map(|v| self.expr(v));
        let count = decls.len();
        for (i, decl) in decls.into_iter().enumerate() {
            let Some(decl) = decl else { continue };
            if decl.name().is_empty() {
                continue;
            }
            let component = component_of(value.as_ref(), i, count)
                .unwrap_or_else(|| SsaExpr::Literal("0".to_string()));
            let dest = self.define(decl.name());
            self.push(Instruction::Assign {
                dest,
                implicit_defs: Vec::new(),
                prev: None,
                op: None,
                value: component,
            });
        }
    }

    fn assignment(&mut self, node: NodeRef<'_>) -> SsaExpr {
        let value = node
            .child("rightHandSide")
            .map(|r| self.expr(r))
            .unwrap_or_else(|| SsaExpr::Literal("0".to_string()));
        let op = node.str_field("operator");
        let op = op.strip_suffix('=').unwrap_or("");

        let Some(lhs) = node.child("leftHandSide") else {
            return value;
        };
        if lhs.is(NodeType::TupleExpression) {
            let components = lhs.items_of("components");
            let count = components.len();
            let mut dests = Vec::new();
            for (i, component) in components.into_iter().enumerate() {
                let Some(component) = component else { continue };
                let part = component_of(Some(&value), i, count)
                    .unwrap_or_else(|| SsaExpr::Literal("0".to_string()));
                dests.push(SsaExpr::Var(self.write(component, "", part)));
            }
            return SsaExpr::Tuple(dests);
        }
        SsaExpr::Var(self.write(lhs, op, value))
    }

    /// Emit `target = value` (or `target = prev op value`) and return the new version
    fn write(&mut self, target: NodeRef<'_>, op: &str, value: SsaExpr) -> SsaVar {
        self.hoist_index_calls(target);
        let name = composite_name(target);
        let path = access_path(target);

        let (prev, op) = if op.is_empty() {
            (None, None)
        } else {
            (Some(self.ctx.use_var(&name)), Some(op.to_string()))
        };
        let dest = self.define(&name);
        let implicit_defs = if path.len() > 1 {
            path[..path.len() - 1].iter().map(|p| self.define(p)).collect()
        } else {
            Vec::new()
        };
        self.push(Instruction::Assign {
            dest: dest.clone(),
            implicit_defs,
            prev,
            op,
            value,
        });
        dest
    }

    /// Calls inside index expressions (`m[f()]`) still execute
    fn hoist_index_calls(&mut self, node: NodeRef<'_>) {
        match node.node_type() {
            NodeType::IndexAccess => {
                if let Some(index) = node.child("indexExpression") {
                    self.expr(index);
                }
                if let Some(base) = node.child("baseExpression") {
                    self.hoist_index_calls(base);
                }
            }
            NodeType::MemberAccess => {
                if let Some(base) = node.child("expression") {
                    self.hoist_index_calls(base);
                }
            }
            _ => {}
        }
    }

    fn revert_statement(&mut self, call: NodeRef<'_>) {
        let args = self.arguments(call);
        let error = call.child("expression").map(expression_text).unwrap_or_default();
        let callee = format!("revert {error}");
        let dest = self.ctx.fresh_call_dest();
        self.defined.insert(dest.name.clone());
        let location = call.src();
        self.call_sites
            .push(CallSite::new(callee.clone(), CallType::Revert, location));
        self.push(Instruction::Call {
            dest,
            callee,
            call_type: CallType::Revert,
            receiver: None,
            options: Vec::new(),
            args,
            location,
        });
    }

    fn try_statement(&mut self, node: NodeRef<'_>) {
        let result = node.child("externalCall").map(|c| self.expr(c));
        for (i, clause) in node.children("clauses").into_iter().enumerate() {
            let params = clause
                .child("parameters")
                .map(|p| p.children("parameters"))
                .unwrap_or_default();
            let count = params.len();
            for (j, param) in params.into_iter().enumerate() {
                if param.name().is_empty() {
                    continue;
                }
                // success clause binds the call's results; catch clauses the error data
                let value = if i == 0 {
                    component_of(result.as_ref(), j, count)
                        .unwrap_or_else(|| SsaExpr::Literal("0".to_string()))
                } else {
                    SsaExpr::Opaque("catch".to_string())
                };
                let dest = self.define(param.name());
                self.push(Instruction::Assign {
                    dest,
                    implicit_defs: Vec::new(),
                    prev: None,
                    op: None,
                    value,
                });
            }
            self.body(clause.child("block"));
        }
    }

    fn arguments(&mut self, call: NodeRef<'_>) -> Vec<SsaExpr> {
        call.children("arguments")
            .into_iter()
            .map(|arg| self.expr(arg))
            .collect()
    }

    pub fn expr(&mut self, node: NodeRef<'_>) -> SsaExpr {
        match node.node_type() {
            NodeType::Identifier => SsaExpr::Var(self.ctx.use_var(node.name())),
            NodeType::MemberAccess | NodeType::IndexAccess if is_location(node) => {
                self.hoist_index_calls(node);
                SsaExpr::Var(self.ctx.use_var(&composite_name(node)))
            }
            NodeType::MemberAccess => {
                if let Some(base) = node.child("expression") {
                    self.expr(base);
                }
                SsaExpr::Opaque(expression_text(node))
            }
            NodeType::IndexAccess | NodeType::IndexRangeAccess => {
                for key in [
                    "baseExpression",
                    "indexExpression",
                    "startExpression",
                    "endExpression",
                ] {
                    if let Some(child) = node.child(key) {
                        self.expr(child);
                    }
                }
                SsaExpr::Opaque(expression_text(node))
            }
            NodeType::Literal => SsaExpr::Literal(expression_text(node)),
            NodeType::BinaryOperation => {
                let lhs = self.operand(node, "leftExpression");
                let rhs = self.operand(node, "rightExpression");
                SsaExpr::Binary {
                    op: node.str_field("operator").to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }
            NodeType::UnaryOperation => self.unary(node),
            NodeType::Assignment => self.assignment(node),
            NodeType::Conditional => {
                let cond = self.operand(node, "condition");
                let then = self.operand(node, "trueExpression");
                let otherwise = self.operand(node, "falseExpression");
                SsaExpr::Ternary {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                }
            }
            NodeType::TupleExpression => {
                let components = node.items_of("components");
                if components.len() == 1 && !node.bool_field("isInlineArray") {
                    if let Some(inner) = components[0] {
                        return self.expr(inner);
                    }
                }
                SsaExpr::Tuple(
                    components
                        .into_iter()
                        .map(|c| match c {
                            Some(c) => self.expr(c),
                            None => SsaExpr::Literal(String::new()),
                        })
                        .collect(),
                )
            }
            NodeType::FunctionCall => self.call(node),
            _ => SsaExpr::Opaque(expression_text(node)),
        }
    }

    fn operand(&mut self, node: NodeRef<'_>, key: &str) -> SsaExpr {
        match node.child(key) {
            Some(child) => self.expr(child),
            None => SsaExpr::Opaque(String::new()),
        }
    }

    fn unary(&mut self, node: NodeRef<'_>) -> SsaExpr {
        let op = node.str_field("operator");
        let Some(sub) = node.child("subExpression") else {
            return SsaExpr::Opaque(expression_text(node));
        };
        match op {
            "++" | "--" => {
                let before = self.ctx.use_var(&composite_name(sub));
                let arith = if op == "++" { "+" } else { "-" };
                let after = self.write(sub, arith, SsaExpr::Literal("1".to_string()));
                if node.bool_field("prefix") {
                    SsaExpr::Var(after)
                } else {
                    SsaExpr::Var(before)
                }
            }
            "delete" => {
                self.write(sub, "", SsaExpr::Literal("0".to_string()));
                SsaExpr::Literal("0".to_string())
            }
            _ => {
                let operand = self.expr(sub);
                SsaExpr::Unary {
                    op: op.to_string(),
                    operand: Box::new(operand),
                }
            }
        }
    }

    fn call(&mut self, node: NodeRef<'_>) -> SsaExpr {
        if is_type_conversion(node) || is_struct_constructor(node) {
            let name = node.child("expression").map(expression_text).unwrap_or_default();
            let args = self.arguments(node);
            return SsaExpr::TypeApply { name, args };
        }

        let receiver = match callee_of(node) {
            Some(callee) if callee.is(NodeType::MemberAccess) => callee
                .child("expression")
                .filter(|r| !(r.is(NodeType::Identifier) && NAMESPACE_RECEIVERS.contains(&r.name())))
                .map(|r| self.expr(r)),
            _ => None,
        };

        let mut options = Vec::new();
        let mut cursor = node.child("expression");
        while let Some(callee) = cursor.filter(|c| c.is(NodeType::FunctionCallOptions)) {
            let names = callee.field("names");
            let names = names.raw().as_array().cloned().unwrap_or_default();
            for (name, value) in names.iter().zip(callee.children("options")) {
                let value = self.expr(value);
                options.push((name.as_str().unwrap_or_default().to_string(), value));
            }
            cursor = callee.child("expression");
        }

        let args = self.arguments(node);
        let call_type = classify_call(node, self.calls);
        let callee = call_name(node);
        let location = node.src();
        let dest = self.ctx.fresh_call_dest();
        self.defined.insert(dest.name.clone());

        self.call_sites
            .push(CallSite::new(callee.clone(), call_type, location));
        self.push(Instruction::Call {
            dest: dest.clone(),
            callee,
            call_type,
            receiver,
            options,
            args,
            location,
        });
        SsaExpr::Var(dest)
    }
}

/// i-th component of a tuple value, or the whole value when shapes differ
fn component_of(value: Option<&SsaExpr>, index: usize, count: usize) -> Option<SsaExpr> {
    match value {
        Some(SsaExpr::Tuple(items)) if items.len() == count => items.get(index).cloned(),
        Some(other) => Some(other.clone()),
        None => None,
    }
}
