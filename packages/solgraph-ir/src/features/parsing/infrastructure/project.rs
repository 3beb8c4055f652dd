//! Project discovery
//!
//! Foundry layout: sources under `src/`, one artifact per contract at
//! `out/<Name>.sol/<Name>.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::features::parsing::ports::BuildTool;

/// Map contract name (file stem) to source path for every `src/**/*.sol`
pub fn find_source_files(project: &Path) -> BTreeMap<String, PathBuf> {
    let src_dir = project.join("src");
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(&src_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "sol") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.insert(stem.to_string(), path.to_path_buf());
        }
    }

    debug!(count = files.len(), dir = %src_dir.display(), "discovered source files");
    files
}

/// Artifacts for the given contract names that exist on disk
pub fn find_ast_files<'a, I>(project: &Path, names: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a String>,
{
    let out_dir = project.join("out");
    names
        .into_iter()
        .map(|name| out_dir.join(format!("{name}.sol")).join(format!("{name}.json")))
        .filter(|path| path.is_file())
        .collect()
}

/// Clean and rebuild. A failing toolchain yields no artifacts instead of an error.
pub fn build_project(tool: &dyn BuildTool, project: &Path) -> bool {
    let result = tool.clean(project).and_then(|_| tool.build_ast(project));
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(project = %project.display(), error = %e, "build failed, no AST artifacts");
            false
        }
    }
}

/// Sources plus their artifacts, in contract-name order
#[derive(Debug, Clone, Default)]
pub struct ProjectArtifacts {
    pub sources: BTreeMap<String, PathBuf>,
    pub ast_files: Vec<PathBuf>,
}

impl ProjectArtifacts {
    pub fn is_empty(&self) -> bool {
        self.ast_files.is_empty()
    }
}

/// Build (unless skipped) and discover
pub fn prepare_project(
    tool: &dyn BuildTool,
    project: &Path,
    skip_build: bool,
) -> ProjectArtifacts {
    let sources = find_source_files(project);
    if !skip_build && !build_project(tool, project) {
        return ProjectArtifacts {
            sources,
            ast_files: Vec::new(),
        };
    }
    let ast_files = find_ast_files(project, sources.keys());
    ProjectArtifacts { sources, ast_files }
}
