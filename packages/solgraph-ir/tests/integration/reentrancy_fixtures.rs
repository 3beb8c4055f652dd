//! Reentrancy detector over assembled contracts
//!
//! Each fixture is a small `Bank` contract; the detector must flag exactly
//! the functions where an external call is followed by a state write.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use solgraph_ir::config::{AnalysisConfig, Preset};
use solgraph_ir::{DetectionMode, Severity};

fn findings_for(functions: Vec<serde_json::Value>, config: &AnalysisConfig) -> Vec<String> {
    analyze_with(&bank(functions), config)
        .into_iter()
        .flat_map(|c| c.findings)
        .map(|f| f.qualified_name())
        .collect()
}

fn flagged(functions: Vec<serde_json::Value>) -> Vec<String> {
    findings_for(functions, &AnalysisConfig::default())
}

#[test]
fn test_call_then_write_is_flagged() {
    let withdraw = function(
        "withdraw",
        "external",
        vec![param("amount", "uint256")],
        vec![send_ether("amount"), assign(ident("x"), "=", number("5"))],
    );
    assert_eq!(flagged(vec![withdraw]), vec!["Bank.withdraw"]);
}

#[test]
fn test_write_then_call_is_clean() {
    let withdraw = function(
        "withdraw",
        "external",
        vec![param("amount", "uint256")],
        vec![assign(ident("x"), "=", number("5")), send_ether("amount")],
    );
    assert!(flagged(vec![withdraw]).is_empty());
}

#[test]
fn test_call_without_later_write_is_clean() {
    let ping = function("ping", "public", vec![], vec![send_ether("x")]);
    assert!(flagged(vec![ping]).is_empty());
}

// EDGE CASE: revert / require are not external calls
#[test]
fn test_revert_family_is_not_external() {
    let bail = function(
        "bail",
        "external",
        vec![],
        vec![revert("x"), assign(ident("x"), "=", number("5"))],
    );
    let guarded = function(
        "guarded",
        "external",
        vec![param("ok", "bool")],
        vec![require(ident("ok"), "no"), assign(ident("x"), "=", number("5"))],
    );
    assert!(flagged(vec![bail, guarded]).is_empty());
}

#[test]
fn test_classic_withdraw() {
    let withdraw = function(
        "withdraw",
        "external",
        vec![],
        vec![
            declare("bal", "uint256", Some(index(ident("balances"), msg_sender()))),
            send_ether("bal"),
            assign(index(ident("balances"), msg_sender()), "=", number("0")),
        ],
    );
    let analyses = analyze(&bank(vec![withdraw]));
    let finding = &analyses[0].findings[0];
    assert_eq!(finding.detector, "reentrancy");
    assert_eq!(finding.severity, Severity::High);
    assert!(finding.description.contains("msg.sender.call"));
    assert!(finding.description.contains("`balances`"));
}

#[test]
fn test_checks_effects_interactions_is_clean() {
    let withdraw = function(
        "withdraw",
        "external",
        vec![],
        vec![
            declare("bal", "uint256", Some(index(ident("balances"), msg_sender()))),
            assign(index(ident("balances"), msg_sender()), "=", number("0")),
            send_ether("bal"),
        ],
    );
    assert!(flagged(vec![withdraw]).is_empty());
}

#[test]
fn test_contract_cast_call_is_external() {
    let sync = function(
        "sync",
        "external",
        vec![param("vault", "address")],
        vec![
            call_stmt(member(cast("IVault", ident("vault")), "deposit"), vec![]),
            assign(ident("x"), "+=", number("1")),
        ],
    );
    assert_eq!(flagged(vec![sync]), vec!["Bank.sync"]);
}

#[test]
fn test_interface_typed_receiver_is_external() {
    let pull = function(
        "pull",
        "external",
        vec![],
        vec![
            call_stmt(member(typed_ident("token", "contract IERC20"), "approve"), vec![msg_sender(), number("1")]),
            assign(ident("x"), "=", number("1")),
        ],
    );
    assert_eq!(flagged(vec![pull]), vec!["Bank.pull"]);
}

// EDGE CASE: a call result stored in state; the hoisted call block precedes the write
#[test]
fn test_call_result_assigned_in_one_statement_is_flagged() {
    let refresh = function(
        "refresh",
        "external",
        vec![],
        vec![assign(
            ident("x"),
            "=",
            call(member(typed_ident("token", "contract IERC20"), "balanceOf"), vec![msg_sender()]),
        )],
    );
    let analyses = analyze(&bank(vec![refresh.clone()]));
    let lines = ssa_lines(&analyses[0], "refresh");
    assert_eq!(lines.len(), 2);
    assert!(lines[0][0].contains("call[external]"));
    assert!(lines[1][0].starts_with("x_1 = ret1_1"));
    assert_eq!(flagged(vec![refresh]), vec!["Bank.refresh"]);
}

// EDGE CASE: the external call lives in an internal helper
#[test]
fn test_call_inside_inlined_helper() {
    let pay = function("_pay", "internal", vec![param("amount", "uint256")], vec![send_ether("amount")]);
    let withdraw = function(
        "withdraw",
        "external",
        vec![param("amount", "uint256")],
        vec![
            call_stmt(ident("_pay"), vec![ident("amount")]),
            assign(ident("x"), "=", number("0")),
        ],
    );

    let balanced = findings_for(vec![pay.clone(), withdraw.clone()], &AnalysisConfig::default());
    assert_eq!(balanced, vec!["Bank.withdraw"]);

    let fast = findings_for(vec![pay, withdraw], &AnalysisConfig::preset(Preset::Fast));
    assert!(fast.is_empty());
}

#[test]
fn test_guard_modifier_honored_when_enabled() {
    let withdraw = with_modifier(
        function(
            "withdraw",
            "external",
            vec![],
            vec![send_ether("x"), assign(ident("x"), "=", number("0"))],
        ),
        "nonReentrant",
    );
    assert_eq!(flagged(vec![withdraw.clone()]), vec!["Bank.withdraw"]);

    let config = AnalysisConfig::default().honor_reentrancy_guards(true);
    assert!(findings_for(vec![withdraw], &config).is_empty());
}

// EDGE CASE: write only in the sibling branch of the call
#[test]
fn test_reachability_mode_prunes_sibling_branch() {
    let split = function(
        "split",
        "external",
        vec![param("c", "bool")],
        vec![if_else(
            ident("c"),
            vec![send_ether("x")],
            Some(vec![assign(ident("x"), "=", number("1"))]),
        )],
    );
    assert_eq!(flagged(vec![split.clone()]), vec!["Bank.split"]);

    let strict = AnalysisConfig::default().detection_mode(DetectionMode::Reachability);
    assert!(findings_for(vec![split], &strict).is_empty());
}

#[test]
fn test_internal_functions_are_not_entrypoints() {
    let helper = function(
        "_helper",
        "internal",
        vec![],
        vec![send_ether("x"), assign(ident("x"), "=", number("0"))],
    );
    assert!(flagged(vec![helper]).is_empty());
}
