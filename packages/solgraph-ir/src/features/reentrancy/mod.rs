//! Reentrancy: external call followed by a state-variable write

pub mod domain;
pub mod infrastructure;
