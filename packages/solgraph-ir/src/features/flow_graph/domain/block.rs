//! Basic block domain model
use std::fmt;

use serde::{Serialize, Serializer};

use crate::features::data_flow::domain::AccessSet;
use crate::features::parsing::domain::{StatementKind, TypedStatement};
use crate::features::parsing::infrastructure::expression_text;
use crate::features::ssa::domain::{Instruction, SsaVersions};
use crate::shared::models::{AstNode, NodeType};

/// Position of a block inside a refined loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopRole {
    Init,
    Header,
    Body,
    Increment,
    Exit,
}

impl LoopRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopRole::Init => "Init",
            LoopRole::Header => "Header",
            LoopRole::Body => "Body",
            LoopRole::Increment => "Increment",
            LoopRole::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BranchSide {
    True,
    False,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Goto(String),
    Branch {
        condition: AstNode,
        then_id: String,
        else_id: String,
    },
    Return,
    Revert,
    /// Not yet finalized; must not reach SSA construction
    Pending,
}

impl Terminator {
    /// Explicit successor ids, in `then`/`else` order for branches
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Terminator::Goto(target) => vec![target.as_str()],
            Terminator::Branch {
                then_id, else_id, ..
            } => vec![then_id.as_str(), else_id.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Terminator::Pending)
    }

    /// `Goto(next)` when there is a next block, `Pending` otherwise
    pub fn goto_or_pending(next: Option<&str>) -> Self {
        match next {
            Some(id) => Terminator::Goto(id.to_string()),
            None => Terminator::Pending,
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Goto(target) => write!(f, "goto {target}"),
            Terminator::Branch {
                condition,
                then_id,
                else_id,
            } => write!(
                f,
                "if ({}) then goto {} else goto {}",
                expression_text(condition.view()),
                then_id,
                else_id
            ),
            Terminator::Return => f.write_str("return"),
            Terminator::Revert => f.write_str("revert"),
            Terminator::Pending => f.write_str("pending"),
        }
    }
}

impl Serialize for Terminator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicBlock {
    pub id: String,
    pub statements: Vec<TypedStatement>,
    pub terminator: Terminator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<LoopRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_side: Option<BranchSide>,
    pub accesses: AccessSet,
    pub ssa_versions: SsaVersions,
    #[serde(rename = "ssa_statements")]
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            statements: Vec::new(),
            terminator: Terminator::Pending,
            role: None,
            branch_side: None,
            accesses: AccessSet::default(),
            ssa_versions: SsaVersions::default(),
            instructions: Vec::new(),
        }
    }

    pub fn with_statements(mut self, statements: Vec<TypedStatement>) -> Self {
        self.statements = statements;
        self
    }

    pub fn with_role(mut self, role: LoopRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_side(mut self, side: BranchSide) -> Self {
        self.branch_side = Some(side);
        self
    }

    pub fn with_terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn last_statement(&self) -> Option<&TypedStatement> {
        self.statements.last()
    }

    pub fn contains_kind(&self, kind: StatementKind) -> bool {
        self.statements.iter().any(|s| s.kind == kind)
    }

    /// Last statement is an `if`/loop the refiner already turned into a
    /// `Branch`; its bodies live in other blocks.
    pub fn is_refined_head(&self, index: usize) -> bool {
        index + 1 == self.statements.len()
            && self.statements[index].kind.is_structured()
            && matches!(self.terminator, Terminator::Branch { .. })
    }

    pub fn is_loop_header(&self) -> bool {
        self.role == Some(LoopRole::Header)
    }
}

/// Terminator implied by a block's final statement: `Return`/`Revert` for
/// returns and reverts, `fallthrough` otherwise
pub fn closing_terminator(statements: &[TypedStatement], fallthrough: Terminator) -> Terminator {
    match statements.last() {
        Some(last) if last.kind == StatementKind::Return => Terminator::Return,
        Some(last) if is_revert(last) => Terminator::Revert,
        _ => fallthrough,
    }
}

/// `revert(...)`, `revert Err(...)`
pub fn is_revert(statement: &TypedStatement) -> bool {
    let node = statement.view();
    match node.node_type() {
        NodeType::RevertStatement => true,
        NodeType::ExpressionStatement => node
            .child("expression")
            .filter(|e| e.is(NodeType::FunctionCall))
            .and_then(|call| call.child("expression"))
            .map_or(false, |callee| {
                callee.is(NodeType::Identifier) && callee.name() == "revert"
            }),
        _ => false,
    }
}

/// Sequential `Block{n}` ids, one allocator per function
#[derive(Debug, Clone, Default)]
pub struct BlockIdAllocator {
    next: usize,
}

impl BlockIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("Block{}", self.next);
        self.next += 1;
        id
    }

    pub fn peek(&self) -> usize {
        self.next
    }
}
