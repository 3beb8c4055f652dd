//! Foundry project discovery and the project entry point

#[path = "../common/mod.rs"]
mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use solgraph_ir::config::AnalysisConfig;
use solgraph_ir::errors::{Result, SolgraphError};
use solgraph_ir::features::parsing::infrastructure::{
    build_project, find_ast_files, find_source_files, prepare_project, ForgeBuildTool,
};
use solgraph_ir::features::parsing::ports::BuildTool;
use solgraph_ir::pipeline::analyze_project;
use tempfile::TempDir;

const BANK_SOURCE: &str = "contract Bank {}\n";

/// Build tool that records invocations and optionally fails
#[derive(Default)]
struct RecordingTool {
    fail: bool,
    cleans: AtomicUsize,
    builds: AtomicUsize,
}

impl RecordingTool {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl BuildTool for RecordingTool {
    fn clean(&self, _project: &Path) -> Result<()> {
        self.cleans.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn build_ast(&self, _project: &Path) -> Result<()> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(SolgraphError::build("compilation failed"))
        } else {
            Ok(())
        }
    }
}

/// src/Bank.sol, src/lib/Math.sol, src/README.md and one Bank artifact
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/lib")).unwrap();
    fs::create_dir_all(root.join("out/Bank.sol")).unwrap();
    fs::write(root.join("src/Bank.sol"), BANK_SOURCE).unwrap();
    fs::write(root.join("src/lib/Math.sol"), "library Math {}\n").unwrap();
    fs::write(root.join("src/README.md"), "# docs\n").unwrap();

    let withdraw = function(
        "withdraw",
        "external",
        vec![],
        vec![send_ether("amount"), assign(index(ident("balances"), msg_sender()), "=", number("0"))],
    );
    fs::write(root.join("out/Bank.sol/Bank.json"), artifact_json(&bank(vec![withdraw]))).unwrap();
    dir
}

#[test]
fn test_find_source_files_recurses_and_filters() {
    let dir = project();
    let sources = find_source_files(dir.path());
    let names: Vec<&String> = sources.keys().collect();
    assert_eq!(names, vec!["Bank", "Math"]);
    assert!(sources["Math"].ends_with("src/lib/Math.sol"));
}

// EDGE CASE: no src directory at all
#[test]
fn test_find_source_files_missing_src() {
    let dir = TempDir::new().unwrap();
    assert!(find_source_files(dir.path()).is_empty());
}

#[test]
fn test_find_ast_files_only_existing() {
    let dir = project();
    let sources = find_source_files(dir.path());
    let artifacts = find_ast_files(dir.path(), sources.keys());
    assert_eq!(artifacts.len(), 1);
    assert!(artifacts[0].ends_with("out/Bank.sol/Bank.json"));
}

#[test]
fn test_build_runs_clean_then_build() {
    let dir = project();
    let tool = RecordingTool::default();
    assert!(build_project(&tool, dir.path()));
    assert_eq!(tool.cleans.load(Ordering::SeqCst), 1);
    assert_eq!(tool.builds.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_build_yields_no_artifacts() {
    let dir = project();
    let tool = RecordingTool::failing();
    let artifacts = prepare_project(&tool, dir.path(), false);
    assert!(artifacts.is_empty());
    assert_eq!(artifacts.sources.len(), 2);

    let analyses = analyze_project(&tool, dir.path(), false, &AnalysisConfig::default());
    assert!(analyses.is_empty());
}

#[test]
fn test_skip_build_uses_existing_artifacts() {
    let dir = project();
    let tool = RecordingTool::failing();
    let artifacts = prepare_project(&tool, dir.path(), true);
    assert_eq!(artifacts.ast_files.len(), 1);
    assert_eq!(tool.cleans.load(Ordering::SeqCst), 0);
    assert_eq!(tool.builds.load(Ordering::SeqCst), 0);
}

#[test]
fn test_analyze_project_loads_source_text() {
    let dir = project();
    let tool = RecordingTool::default();
    let analyses = analyze_project(&tool, dir.path(), false, &AnalysisConfig::default());

    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].source.as_deref(), Some(BANK_SOURCE));
    assert_eq!(analyses[0].contracts[0].summary.name, "Bank");
    assert_eq!(analyses[0].finding_count(), 1);
}

// EDGE CASE: corrupt artifact is skipped, not fatal
#[test]
fn test_corrupt_artifact_skipped() {
    let dir = project();
    fs::create_dir_all(dir.path().join("out/Math.sol")).unwrap();
    fs::write(dir.path().join("out/Math.sol/Math.json"), "{not json").unwrap();

    let analyses = analyze_project(&RecordingTool::default(), dir.path(), true, &AnalysisConfig::default());
    assert_eq!(analyses.len(), 1);
    assert!(analyses[0].path.ends_with("out/Bank.sol/Bank.json"));
}

#[test]
fn test_forge_missing_binary_fails_build() {
    let dir = project();
    let tool = ForgeBuildTool::with_program("solgraph-test-missing-forge");
    assert!(!build_project(&tool, dir.path()));
}
