//! Common test utilities for solgraph-ir
//!
//! Compiler-AST builders (`serde_json::json!`) and small contract fixtures
//! shared by integration and unit tests.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;
