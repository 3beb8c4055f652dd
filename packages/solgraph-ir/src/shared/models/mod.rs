//! Shared models

mod ast_node;
mod source_location;

pub use ast_node::{AstNode, NodeRef, NodeType};
pub use source_location::{offset_to_line_col, SourceLocation};

// Re-export serde_json::Value for convenience (AST artifacts are raw JSON)
pub use serde_json::Value;
