//! Parsing: compiler AST artifacts in, classified statements out
//!
//! - domain/: `StatementKind`, `TypedStatement`
//! - ports/: `BuildTool`
//! - infrastructure/: classifier, artifact loader, project discovery, forge adapter

pub mod domain;
pub mod infrastructure;
pub mod ports;
