//! Feature modules - each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure models (no I/O)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Algorithms and external adapters

pub mod data_flow;
pub mod flow_graph;
pub mod interprocedural;
pub mod parsing;
pub mod ssa;

// Consumes finished SSA
pub mod reentrancy;
