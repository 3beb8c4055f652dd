//! Statement classification domain model
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::features::parsing::infrastructure::statement_text;
use crate::shared::models::{AstNode, NodeRef};

/// Tagged statement kind, the unit the block builder splits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatementKind {
    Assignment,
    FunctionCall,
    Expression,
    EmitStatement,
    IfStatement,
    Return,
    VariableDeclaration,
    ForLoop,
    WhileLoop,
    Block,
    Unknown,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Assignment => "Assignment",
            StatementKind::FunctionCall => "FunctionCall",
            StatementKind::Expression => "Expression",
            StatementKind::EmitStatement => "EmitStatement",
            StatementKind::IfStatement => "IfStatement",
            StatementKind::Return => "Return",
            StatementKind::VariableDeclaration => "VariableDeclaration",
            StatementKind::ForLoop => "ForLoop",
            StatementKind::WhileLoop => "WhileLoop",
            StatementKind::Block => "Block",
            StatementKind::Unknown => "Unknown",
        }
    }

    /// Control flow the refiner expands into several blocks
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            StatementKind::IfStatement | StatementKind::ForLoop | StatementKind::WhileLoop
        )
    }

    /// Always ends the current block
    pub fn always_splits(&self) -> bool {
        self.is_structured()
            || matches!(self, StatementKind::Return | StatementKind::EmitStatement)
    }

    /// Ends the current block unless it is the last statement
    pub fn is_effectful(&self) -> bool {
        matches!(
            self,
            StatementKind::FunctionCall
                | StatementKind::Assignment
                | StatementKind::VariableDeclaration
        )
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedStatement {
    pub kind: StatementKind,
    pub node: AstNode,
}

impl TypedStatement {
    pub fn new(kind: StatementKind, node: AstNode) -> Self {
        Self { kind, node }
    }

    pub fn view(&self) -> NodeRef<'_> {
        self.node.view()
    }
}

impl std::fmt::Display for TypedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&statement_text(self.view()))
    }
}

// Reports carry the rendered statement, not the raw AST subtree.
impl Serialize for TypedStatement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TypedStatement", 2)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("text", &self.to_string())?;
        state.end()
    }
}
