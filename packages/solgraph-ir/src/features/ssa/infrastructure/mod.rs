//! SSA infrastructure
//!
//! Versioning (lowering), phi insertion, IR-level splitting and invariant
//! checks. `application::FunctionSsa` chains them.

pub mod context;
pub mod errors;
pub mod lowering;
pub mod phi;
pub mod splitter;

pub use context::SsaBuildContext;
pub use errors::{enforce, validate_blocks, SsaError, SsaResult};
pub use lowering::{version_blocks, Lowerer, VersioningResult};
pub use phi::insert_phis;
pub use splitter::{instruction_accesses, split_blocks};
