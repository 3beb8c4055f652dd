//! Internal-call inlining through the contract assembler

#[path = "../common/mod.rs"]
mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use solgraph_ir::config::AnalysisConfig;

fn credit() -> Value {
    function(
        "_credit",
        "internal",
        vec![param("to", "address"), param("amount", "uint256")],
        vec![assign(index(ident("balanceOf"), ident("to")), "+=", ident("amount"))],
    )
}

fn token(functions: Vec<Value>, config: &AnalysisConfig) -> Vec<Vec<String>> {
    let mut nodes = vec![
        state_var("balanceOf", "mapping(address => uint256)", "0:0:0"),
        state_var("x", "uint256", "0:0:0"),
    ];
    nodes.extend(functions);
    let analyses = analyze_with(&source_unit(vec![contract("Token", nodes)]), config);
    let entry = analyses[0].summary.entrypoints[0].name.clone();
    ssa_lines(&analyses[0], &entry)
}

#[test]
fn test_compound_update_substituted_once() {
    let mint = function(
        "mint",
        "external",
        vec![param("to", "address"), param("amount", "uint256")],
        vec![call_stmt(ident("_credit"), vec![ident("to"), ident("amount")])],
    );
    let blocks = token(vec![mint, credit()], &AnalysisConfig::default());

    assert_eq!(
        blocks,
        vec![
            vec!["ret1_1 = call[internal](_credit, to_0, amount_0)".to_string()],
            vec!["balanceOf[to]_1 = balanceOf[to]_0 + amount_0".to_string()],
        ]
    );
    let update = &blocks[1][0];
    assert_eq!(update.matches("amount_0").count(), 1);
}

#[test]
fn test_parameters_renamed_to_arguments() {
    let mint = function(
        "mint",
        "external",
        vec![param("recipient", "address"), param("value", "uint256")],
        vec![call_stmt(ident("_credit"), vec![ident("recipient"), ident("value")])],
    );
    let blocks = token(vec![mint, credit()], &AnalysisConfig::default());
    assert_eq!(blocks[1], vec!["balanceOf[recipient]_1 = balanceOf[recipient]_0 + value_0".to_string()]);
}

#[test]
fn test_callee_writes_get_fresh_versions() {
    let set = function("_set", "internal", vec![], vec![assign(ident("x"), "=", number("2"))]);
    let run = function(
        "run",
        "public",
        vec![],
        vec![
            assign(ident("x"), "=", number("1")),
            call_stmt(ident("_set"), vec![]),
            assign(ident("y"), "=", ident("x")),
        ],
    );
    let lines: Vec<String> = token(vec![run, set], &AnalysisConfig::default())
        .into_iter()
        .flatten()
        .collect();

    assert_eq!(
        lines,
        vec![
            "x_1 = 1".to_string(),
            "ret1_1 = call[internal](_set)".to_string(),
            "x_2 = 2".to_string(),
            "y_1 = x_2".to_string(),
        ]
    );
}

#[test]
fn test_caller_versions_continue_after_callee() {
    let set = function("_set", "internal", vec![], vec![assign(ident("x"), "=", number("2"))]);
    let run = function(
        "run",
        "public",
        vec![],
        vec![
            assign(ident("x"), "=", number("1")),
            call_stmt(ident("_set"), vec![]),
            assign(ident("x"), "=", number("3")),
            assign(ident("y"), "=", ident("x")),
        ],
    );
    let lines: Vec<String> = token(vec![run, set], &AnalysisConfig::default())
        .into_iter()
        .flatten()
        .collect();

    assert_eq!(
        lines,
        vec![
            "x_1 = 1".to_string(),
            "ret1_1 = call[internal](_set)".to_string(),
            "x_2 = 2".to_string(),
            "x_3 = 3".to_string(),
            "y_1 = x_3".to_string(),
        ]
    );
}

// EDGE CASE: callee writes inside one arm; the merge phi sees the spliced version
#[test]
fn test_callee_write_in_branch_merges() {
    let set = function("_set", "internal", vec![], vec![assign(ident("x"), "=", number("2"))]);
    let run = function(
        "run",
        "public",
        vec![param("c", "bool")],
        vec![
            if_else(ident("c"), vec![call_stmt(ident("_set"), vec![])], None),
            assign(ident("y"), "=", ident("x")),
        ],
    );
    let lines: Vec<String> = token(vec![run, set], &AnalysisConfig::default())
        .into_iter()
        .flatten()
        .collect();

    assert!(lines.contains(&"x_1 = 2".to_string()));
    assert!(lines.contains(&"x_2 = phi(x_0, x_1)".to_string()) || lines.contains(&"x_2 = phi(x_1, x_0)".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("y_1 = x_2"));
}

#[test]
fn test_depth_limits_nested_inlining() {
    let outer = function("_outer", "internal", vec![], vec![call_stmt(ident("_inner"), vec![])]);
    let inner = function("_inner", "internal", vec![], vec![assign(ident("x"), "=", number("7"))]);
    let entry = function("entry", "external", vec![], vec![call_stmt(ident("_outer"), vec![])]);

    let shallow: Vec<String> = token(vec![entry.clone(), outer.clone(), inner.clone()], &AnalysisConfig::default())
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(shallow.len(), 2);
    assert!(!shallow.iter().any(|l| l.starts_with("x_")));

    let deep: Vec<String> = token(vec![entry, outer, inner], &AnalysisConfig::default().inline_depth(2))
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(deep.len(), 3);
    assert_eq!(deep[2], "x_1 = 7");
}

// EDGE CASE: self recursion terminates
#[test]
fn test_recursive_helper_expanded_once() {
    let looped = function("_again", "internal", vec![], vec![call_stmt(ident("_again"), vec![])]);
    let entry = function("entry", "external", vec![], vec![call_stmt(ident("_again"), vec![])]);
    let lines: Vec<String> = token(vec![entry, looped], &AnalysisConfig::default().inline_depth(8))
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_inlined_accesses_refreshed() {
    let mint = function(
        "mint",
        "external",
        vec![param("to", "address"), param("amount", "uint256")],
        vec![call_stmt(ident("_credit"), vec![ident("to"), ident("amount")])],
    );
    let mut nodes = vec![state_var("balanceOf", "mapping(address => uint256)", "0:0:0")];
    nodes.extend(vec![mint, credit()]);
    let analyses = analyze(&source_unit(vec![contract("Token", nodes)]));
    let mint = analyses[0].summary.entrypoint("mint").unwrap();

    let writes: Vec<&String> = mint.ssa.iter().flat_map(|b| b.accesses.writes.iter()).collect();
    assert!(writes.iter().any(|w| *w == "balanceOf[to]"));
    assert!(writes.iter().any(|w| *w == "balanceOf"));
}
