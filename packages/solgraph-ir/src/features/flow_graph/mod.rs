//! Flow graph: basic blocks, control-flow refinement and CFG queries

pub mod domain;
pub mod infrastructure;
