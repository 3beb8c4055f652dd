//! Statement classifier
//!
//! Total over any AST shape: nodes the pipeline does not model come back as
//! [`StatementKind::Unknown`] and are carried along untouched.

use crate::features::parsing::domain::{StatementKind, TypedStatement};
use crate::shared::models::{NodeRef, NodeType};

pub fn classify_statement(node: NodeRef<'_>) -> StatementKind {
    match node.node_type() {
        NodeType::ExpressionStatement => match node.child("expression") {
            Some(expr) => match expr.node_type() {
                NodeType::Assignment => StatementKind::Assignment,
                NodeType::FunctionCall => StatementKind::FunctionCall,
                _ => StatementKind::Expression,
            },
            None => StatementKind::Expression,
        },
        NodeType::EmitStatement => StatementKind::EmitStatement,
        NodeType::IfStatement => StatementKind::IfStatement,
        NodeType::Return => StatementKind::Return,
        NodeType::VariableDeclarationStatement => StatementKind::VariableDeclaration,
        NodeType::ForStatement => StatementKind::ForLoop,
        NodeType::WhileStatement => StatementKind::WhileLoop,
        NodeType::Block | NodeType::UncheckedBlock => StatementKind::Block,
        // `revert Err(..)` behaves like a call to revert()
        NodeType::RevertStatement => StatementKind::FunctionCall,
        _ => StatementKind::Unknown,
    }
}

/// Classify a function body in order
pub fn classify_statements<'a, I>(nodes: I) -> Vec<TypedStatement>
where
    I: IntoIterator<Item = NodeRef<'a>>,
{
    nodes
        .into_iter()
        .map(|node| TypedStatement::new(classify_statement(node), node.to_owned_node()))
        .collect()
}
