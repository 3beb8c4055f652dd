//! Shared module - Common types and utilities
//!
//! Types shared across all features: the compiler AST view and source
//! locations. Nothing in here knows about blocks, SSA or detectors.

pub mod models;

pub use models::*;
