//! End-to-end pipeline: blocks, refinement, summaries, report, artifacts

#[path = "../common/mod.rs"]
mod common;

use std::io::Write;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use solgraph_ir::config::AnalysisConfig;
use solgraph_ir::features::flow_graph::domain::{BlockIdAllocator, Terminator};
use solgraph_ir::features::flow_graph::infrastructure::{build_blocks, refine_blocks};
use solgraph_ir::features::parsing::infrastructure::classify_statements;
use solgraph_ir::report::{render_artifact, render_contract};
use solgraph_ir::shared::models::NodeRef;
use solgraph_ir::analyze_artifact;
use tempfile::NamedTempFile;

fn blocks_of(statements: &[Value]) -> Vec<solgraph_ir::features::flow_graph::domain::BasicBlock> {
    let typed = classify_statements(statements.iter().map(NodeRef::new));
    let mut ids = BlockIdAllocator::new();
    build_blocks(typed, &mut ids)
}

#[test]
fn test_block_count_with_return() {
    // x = 1; foo(); return;
    let blocks = blocks_of(&[
        assign(ident("x"), "=", number("1")),
        call_stmt(ident("foo"), vec![]),
        ret(None),
    ]);
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[2].terminator, Terminator::Return);
}

#[test]
fn test_block_count_trailing_effect_pending() {
    // x = 1; foo(); y = 2;
    let blocks = blocks_of(&[
        assign(ident("x"), "=", number("1")),
        call_stmt(ident("foo"), vec![]),
        assign(ident("y"), "=", number("2")),
    ]);
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].terminator, Terminator::Goto("Block1".to_string()));
    assert!(blocks[2].terminator.is_pending());
}

#[test]
fn test_if_refinement_topology() {
    let statements = [
        if_else(
            ident("c"),
            vec![assign(ident("x"), "=", number("1"))],
            Some(vec![assign(ident("x"), "=", number("2"))]),
        ),
        assign(ident("y"), "=", ident("x")),
    ];
    let typed = classify_statements(statements.iter().map(NodeRef::new));
    let mut ids = BlockIdAllocator::new();
    let blocks = build_blocks(typed, &mut ids);
    assert_eq!(blocks.len(), 2);

    let refined = refine_blocks(blocks, &mut ids);
    assert_eq!(refined.len(), 4);

    let ids: Vec<&str> = refined.iter().map(|b| b.id.as_str()).collect();
    let cond = refined[0].terminator.to_string();
    assert!(cond.contains("then goto"));
    assert!(cond.contains("else goto"));
    for target in refined[0].terminator.targets() {
        assert!(ids.contains(&target));
    }
    // merge block is untouched
    assert_eq!(refined[3].id, "Block1");
    assert_eq!(refined[3].statements.len(), 1);
}

fn token() -> solgraph_ir::shared::models::AstNode {
    source_unit(vec![contract(
        "Token",
        vec![
            state_var("balanceOf", "mapping(address => uint256)", "40:10:0"),
            serde_json::json!({"nodeType": "EventDefinition", "name": "Transfer", "src": "60:5:0"}),
            with_src(
                function(
                    "transfer",
                    "external",
                    vec![param("to", "address"), param("amount", "uint256")],
                    vec![
                        assign(index(ident("balanceOf"), msg_sender()), "-=", ident("amount")),
                        call_stmt(ident("_credit"), vec![ident("to"), ident("amount")]),
                    ],
                ),
                "21:30:0",
            ),
            function(
                "_credit",
                "internal",
                vec![param("to", "address"), param("amount", "uint256")],
                vec![assign(index(ident("balanceOf"), ident("to")), "+=", ident("amount"))],
            ),
        ],
    )])
}

#[test]
fn test_contract_summary() {
    let analyses = analyze(&token());
    assert_eq!(analyses.len(), 1);
    let summary = &analyses[0].summary;

    assert_eq!(summary.name, "Token");
    assert_eq!(summary.pragma, "solidity ^0.8.0");
    assert_eq!(summary.state_vars[0].name, "balanceOf");
    assert_eq!(summary.state_vars[0].type_name, "mapping(address => uint256)");
    assert_eq!(summary.events[0].name, "Transfer");
    assert_eq!(
        summary.functions.keys().cloned().collect::<Vec<_>>(),
        vec!["_credit".to_string(), "transfer".to_string()]
    );
    assert_eq!(summary.entrypoints.len(), 1);

    let transfer = &summary.entrypoints[0];
    assert_eq!(transfer.internal_calls(), vec!["_credit".to_string()]);
    assert!(transfer.external_calls().is_empty());
    assert!(analyses[0].findings.is_empty());
}

#[test]
fn test_ssa_is_fully_terminated() {
    let analyses = analyze(&token());
    for function in &analyses[0].summary.entrypoints {
        for block in &function.ssa {
            assert!(!block.terminator.is_pending(), "{} left pending", block.id);
        }
    }
}

#[test]
fn test_report_lines() {
    // `transfer` starts at byte 21: line 2, col 5
    let source = "contract Token {\n    function transfer() external {}\n}\n";
    let analyses = analyze(&token());
    let text = render_contract(&analyses[0], source);
    assert_eq!(
        text,
        "Contract: Token\n\
         Entrypoint: transfer at line 2, col 5\n\
         Internal calls: _credit\n\
         No external calls\n"
    );
}

#[test]
fn test_pipeline_is_idempotent() {
    let unit = token();
    let first = serde_json::to_string(&analyze(&unit)).unwrap();
    let second = serde_json::to_string(&analyze(&unit)).unwrap();
    assert_eq!(first, second);

    let sequential = serde_json::to_string(&analyze_with(&unit, &AnalysisConfig::default().parallel(false))).unwrap();
    assert_eq!(first, sequential);
}

#[test]
fn test_artifact_roundtrip() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(artifact_json(&token()).as_bytes()).unwrap();

    let artifact = analyze_artifact(file.path(), None, &AnalysisConfig::default()).unwrap();
    assert_eq!(artifact.contracts.len(), 1);
    assert_eq!(artifact.finding_count(), 0);
    assert!(render_artifact(&artifact).starts_with("Contract: Token\n"));
}

// EDGE CASE: not an AST artifact
#[test]
fn test_artifact_without_ast_is_error() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"abi": []}"#).unwrap();
    assert!(analyze_artifact(file.path(), None, &AnalysisConfig::default()).is_err());
}
