//! Pipeline: contract assembly and the source-unit / artifact / project
//! entry points

pub mod assembler;
pub mod processor;
pub mod types;

pub use assembler::ContractAssembler;
pub use processor::{analyze_artifact, analyze_project, analyze_source_unit, pragma_text};
pub use types::{
    ArtifactAnalysis, ContractAnalysis, ContractSummary, EventInfo, FunctionInfo, FunctionSummary,
    StateVar,
};
