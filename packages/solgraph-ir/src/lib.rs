/*
 * Solgraph IR - Solidity middle-end for reentrancy analysis
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Compiler AST view, source locations
 * - features/    : Vertical slices (parsing → flow_graph → data_flow → ssa → interprocedural → reentrancy)
 * - pipeline/    : Contract assembly, source-unit and project entry points
 * - config/      : Presets, overrides, YAML
 * - report/      : Stable text report lines, JSON output
 *
 * Parallelism:
 * - Rayon over contracts of a source unit and over project artifacts
 * - Results collected in input order
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Recursive splice threads its state explicitly
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::upper_case_acronyms)] // SSA, CFG naming

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (classification → blocks → accesses → SSA → inlining → detection)
pub mod features;

/// Contract assembly and entry points
pub mod pipeline;

/// Configuration system
pub mod config;

/// Report rendering
pub mod report;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisConfig, Preset};
pub use errors::{Result, SolgraphError};
pub use features::reentrancy::domain::{DetectionMode, Finding, Severity};
pub use pipeline::{
    analyze_artifact, analyze_project, analyze_source_unit, ArtifactAnalysis, ContractAnalysis,
    ContractSummary, FunctionSummary,
};
