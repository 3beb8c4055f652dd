//! Interprocedural: call classification and internal-call inlining

pub mod domain;
pub mod infrastructure;
