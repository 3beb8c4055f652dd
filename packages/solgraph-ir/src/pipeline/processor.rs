//! Source-unit, artifact and project entry points

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use super::assembler::ContractAssembler;
use super::types::{ArtifactAnalysis, ContractAnalysis};
use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::features::parsing::infrastructure::{load_ast_file, prepare_project};
use crate::features::parsing::ports::BuildTool;
use crate::shared::models::{AstNode, NodeRef, NodeType};

/// `pragma solidity ^0.8.0;` -> `solidity ^0.8.0`
pub fn pragma_text(unit: NodeRef<'_>) -> String {
    let Some(pragma) = unit
        .children("nodes")
        .into_iter()
        .find(|n| n.is(NodeType::PragmaDirective))
    else {
        return String::new();
    };
    let literals: Vec<&str> = pragma
        .raw()
        .get("literals")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    match literals.split_first() {
        Some((head, rest)) if !rest.is_empty() => format!("{} {}", head, rest.concat()),
        Some((head, _)) => head.to_string(),
        None => String::new(),
    }
}

/// Analyze every contract of a `SourceUnit`, in declaration order
pub fn analyze_source_unit(unit: &AstNode, config: &AnalysisConfig) -> Vec<ContractAnalysis> {
    let view = unit.view();
    let pragma = pragma_text(view);
    let contracts: Vec<NodeRef<'_>> = view
        .children("nodes")
        .into_iter()
        .filter(|n| n.is(NodeType::ContractDefinition))
        .collect();

    let assembler = ContractAssembler::new(config);
    let results: Vec<ContractAnalysis> = if config.parallel {
        contracts
            .par_iter()
            .map(|c| assembler.analyze(*c, &pragma))
            .collect()
    } else {
        contracts
            .iter()
            .map(|c| assembler.analyze(*c, &pragma))
            .collect()
    };

    info!(
        contracts = results.len(),
        findings = results.iter().map(|r| r.findings.len()).sum::<usize>(),
        "analyzed source unit"
    );
    results
}

/// Load one artifact and analyze it; `source` is used only for reporting
pub fn analyze_artifact(
    path: &Path,
    source: Option<String>,
    config: &AnalysisConfig,
) -> Result<ArtifactAnalysis> {
    let unit = load_ast_file(path)?;
    Ok(ArtifactAnalysis {
        path: path.to_path_buf(),
        source,
        contracts: analyze_source_unit(&unit, config),
    })
}

/// Build, discover and analyze a project.
///
/// A failed build or a project without artifacts yields an empty list;
/// unreadable artifacts are skipped with a warning.
pub fn analyze_project(
    tool: &dyn BuildTool,
    project: &Path,
    skip_build: bool,
    config: &AnalysisConfig,
) -> Vec<ArtifactAnalysis> {
    let artifacts = prepare_project(tool, project, skip_build);
    if artifacts.is_empty() {
        warn!(project = %project.display(), "no src files found");
        return Vec::new();
    }

    let analyze_one = |ast_file: &PathBuf| {
        let source = source_for(ast_file, &artifacts.sources);
        match analyze_artifact(ast_file, source, config) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!(artifact = %ast_file.display(), error = %e, "skipping artifact");
                None
            }
        }
    };

    if config.parallel {
        artifacts.ast_files.par_iter().filter_map(analyze_one).collect()
    } else {
        artifacts.ast_files.iter().filter_map(analyze_one).collect()
    }
}

/// Source text for `out/<Name>.sol/<Name>.json`
fn source_for(
    ast_file: &Path,
    sources: &std::collections::BTreeMap<String, PathBuf>,
) -> Option<String> {
    let stem = ast_file.file_stem()?.to_str()?;
    let path = sources.get(stem)?;
    fs::read_to_string(path).ok()
}
