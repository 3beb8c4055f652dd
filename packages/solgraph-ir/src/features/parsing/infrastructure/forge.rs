//! Foundry build tool adapter

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::errors::{Result, SolgraphError};
use crate::features::parsing::ports::BuildTool;

/// Runs `forge clean` and `forge build --ast` in the project directory
#[derive(Debug, Clone)]
pub struct ForgeBuildTool {
    program: String,
}

impl ForgeBuildTool {
    pub fn new() -> Self {
        Self {
            program: "forge".to_string(),
        }
    }

    /// Use a different executable (wrappers, pinned installs)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, project: &Path, args: &[&str]) -> Result<()> {
        debug!(program = %self.program, ?args, project = %project.display(), "running build tool");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(project)
            .output()
            .map_err(|e| SolgraphError::build(format!("{} {}: {}", self.program, args.join(" "), e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SolgraphError::build(format!(
                "{} {} exited with {}: {}",
                self.program,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

impl Default for ForgeBuildTool {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildTool for ForgeBuildTool {
    fn clean(&self, project: &Path) -> Result<()> {
        self.run(project, &["clean"])
    }

    fn build_ast(&self, project: &Path) -> Result<()> {
        self.run(project, &["build", "--ast"])
    }
}
