use std::path::Path;

use crate::errors::Result;

/// External toolchain that turns a project into compiler AST artifacts
pub trait BuildTool: Send + Sync {
    /// Remove previous artifacts
    fn clean(&self, project: &Path) -> Result<()>;

    /// Compile with AST output enabled
    fn build_ast(&self, project: &Path) -> Result<()>;
}
