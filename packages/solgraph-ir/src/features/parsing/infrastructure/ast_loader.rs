//! AST artifact loading

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::{Result, SolgraphError};
use crate::shared::models::{AstNode, NodeType};

/// Read a build artifact and return its `SourceUnit`.
///
/// Accepts both the Foundry artifact shape (`{"ast": {...}}`) and a bare
/// `SourceUnit` as emitted by `solc --ast-compact-json`.
pub fn load_ast_file(path: &Path) -> Result<AstNode> {
    let text = fs::read_to_string(path)?;
    parse_ast_json(&text)
        .map_err(|e| match e {
            SolgraphError::Parse(msg) => SolgraphError::parse_error(format!("{}: {}", path.display(), msg)),
            other => other,
        })
}

pub fn parse_ast_json(text: &str) -> Result<AstNode> {
    let value: Value = serde_json::from_str(text)?;
    source_unit_of(value)
}

fn source_unit_of(mut value: Value) -> Result<AstNode> {
    if let Some(ast) = value.get_mut("ast").map(Value::take) {
        return Ok(AstNode::new(ast));
    }
    let node = AstNode::new(value);
    if node.node_type() == NodeType::SourceUnit {
        Ok(node)
    } else {
        Err(SolgraphError::parse_error("artifact has no \"ast\" key and is not a SourceUnit"))
    }
}
