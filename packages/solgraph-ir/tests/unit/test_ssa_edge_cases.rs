//! SSA construction edge cases through the full pipeline

#[path = "../common/mod.rs"]
mod common;

use std::collections::BTreeSet;

use common::*;
use serde_json::{json, Value};
use solgraph_ir::features::flow_graph::domain::Terminator;
use solgraph_ir::ContractAnalysis;

fn single(function: Value) -> ContractAnalysis {
    analyze(&bank(vec![function])).remove(0)
}

fn for_loop(body: Vec<Value>) -> Value {
    json!({
        "nodeType": "ForStatement",
        "initializationExpression": declare("i", "uint256", Some(number("0"))),
        "condition": binary(ident("i"), "<", number("10")),
        "loopExpression": expr_stmt(json!({"nodeType": "UnaryOperation", "operator": "++",
                                           "prefix": false, "subExpression": ident("i")})),
        "body": block(body),
    })
}

// EDGE CASE: empty body
#[test]
fn test_empty_body() {
    let analysis = single(function("noop", "external", vec![], vec![]));
    let noop = analysis.summary.entrypoint("noop").unwrap();
    assert!(noop.ssa.len() <= 1);
    assert!(noop.ssa.iter().all(|b| b.instructions.is_empty()));
    assert!(analysis.findings.is_empty());
}

#[test]
fn test_only_return() {
    let analysis = single(function("stop", "public", vec![], vec![ret(None)]));
    let stop = analysis.summary.entrypoint("stop").unwrap();
    assert_eq!(stop.ssa.len(), 1);
    assert_eq!(stop.ssa[0].terminator, Terminator::Return);
}

// EDGE CASE: `(bool ok, ) = target.call{value: amount}("")` still counts as the call
#[test]
fn test_tuple_declaration_with_call() {
    let call = call_with_value(member(msg_sender(), "call"), ident("amount"), vec![string_lit("")]);
    let declaration = json!({
        "nodeType": "VariableDeclarationStatement",
        "declarations": [param("ok", "bool"), null],
        "initialValue": call,
    });
    let withdraw = function(
        "withdraw",
        "external",
        vec![param("amount", "uint256")],
        vec![declaration, assign(ident("x"), "=", number("0"))],
    );
    let analysis = single(withdraw);
    assert_eq!(analysis.findings.len(), 1);

    let lines: Vec<String> = ssa_lines(&analysis, "withdraw").into_iter().flatten().collect();
    assert!(lines.iter().any(|l| l.starts_with("ok_1 = ret1_1")));
}

#[test]
fn test_for_loop_header_phi() {
    let count = function(
        "count",
        "external",
        vec![],
        vec![for_loop(vec![assign(ident("x"), "+=", ident("i"))])],
    );
    let analysis = single(count);
    let lines: Vec<String> = ssa_lines(&analysis, "count").into_iter().flatten().collect();
    assert!(
        lines.iter().any(|l| l.starts_with("i_") && l.contains("= phi(")),
        "no loop phi for i in {lines:?}"
    );
}

// EDGE CASE: statements the lowering does not model are kept opaque
#[test]
fn test_inline_assembly_does_not_panic() {
    let asm = json!({"nodeType": "InlineAssembly", "src": "0:0:0"});
    let analysis = single(function(
        "raw",
        "external",
        vec![],
        vec![asm, assign(ident("x"), "=", number("1"))],
    ));
    assert!(analysis.findings.is_empty());
    assert!(!analysis.summary.entrypoint("raw").unwrap().ssa.is_empty());
}

#[test]
fn test_block_ids_unique_and_terminated() {
    let busy = function(
        "busy",
        "external",
        vec![param("c", "bool")],
        vec![
            if_else(ident("c"), vec![assign(ident("x"), "=", number("1"))], Some(vec![send_ether("x")])),
            for_loop(vec![
                if_else(ident("c"), vec![ret(None)], None),
                assign(index(ident("balances"), msg_sender()), "+=", number("1")),
            ]),
            while_loop(ident("c"), vec![assign(ident("c"), "=", string_lit("false"))]),
        ],
    );
    let analysis = single(busy);
    let ssa = &analysis.summary.entrypoint("busy").unwrap().ssa;

    let ids: BTreeSet<&str> = ssa.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids.len(), ssa.len());
    for block in ssa {
        assert!(!block.terminator.is_pending(), "{} left pending", block.id);
    }
}
