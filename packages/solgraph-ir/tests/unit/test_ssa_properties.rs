//! Property-based tests for SSA construction
//!
//! Programs are generated over a three-variable alphabet so that
//! reassignment and merging happen often. Entrypoint programs also call
//! an internal helper that writes the same names.

#[path = "../common/mod.rs"]
mod common;

use std::collections::BTreeMap;

use common::*;
use proptest::prelude::*;
use serde_json::Value;
use solgraph_ir::config::AnalysisConfig;
use solgraph_ir::features::flow_graph::domain::BlockIdAllocator;
use solgraph_ir::features::flow_graph::infrastructure::build_blocks;
use solgraph_ir::features::interprocedural::infrastructure::CallContext;
use solgraph_ir::features::parsing::infrastructure::classify_statements;
use solgraph_ir::features::ssa::application::FunctionSsa;
use solgraph_ir::features::ssa::domain::Instruction;
use solgraph_ir::shared::models::NodeRef;

const VARS: [&str; 3] = ["a", "b", "c"];

#[derive(Debug, Clone)]
enum Simple {
    Const(usize, u32),
    Copy(usize, usize),
    Bump(usize),
    Touch(usize),
}

#[derive(Debug, Clone)]
enum Stmt {
    Simple(Simple),
    If(usize, Vec<Simple>, Vec<Simple>),
}

fn simple() -> impl Strategy<Value = Simple> {
    prop_oneof![
        (0..3usize, 0..100u32).prop_map(|(v, n)| Simple::Const(v, n)),
        (0..3usize, 0..3usize).prop_map(|(v, w)| Simple::Copy(v, w)),
        (0..3usize).prop_map(Simple::Bump),
        (0..3usize).prop_map(Simple::Touch),
    ]
}

fn stmt() -> impl Strategy<Value = Stmt> {
    prop_oneof![
        3 => simple().prop_map(Stmt::Simple),
        1 => (0..3usize, prop::collection::vec(simple(), 1..4), prop::collection::vec(simple(), 1..4))
            .prop_map(|(c, t, e)| Stmt::If(c, t, e)),
    ]
}

fn simple_json(s: &Simple) -> Value {
    match s {
        Simple::Const(v, n) => assign(ident(VARS[*v]), "=", number(&n.to_string())),
        Simple::Copy(v, w) => assign(ident(VARS[*v]), "=", ident(VARS[*w])),
        Simple::Bump(v) => assign(ident(VARS[*v]), "+=", number("1")),
        Simple::Touch(v) => expr_stmt(binary(ident(VARS[*v]), "+", number("1"))),
    }
}

fn stmt_json(s: &Stmt) -> Value {
    match s {
        Stmt::Simple(s) => simple_json(s),
        Stmt::If(c, t, e) => if_else(
            ident(VARS[*c]),
            t.iter().map(simple_json).collect(),
            Some(e.iter().map(simple_json).collect()),
        ),
    }
}

#[derive(Debug, Clone)]
enum CallerStmt {
    Stmt(Stmt),
    Helper,
}

fn caller_stmt() -> impl Strategy<Value = CallerStmt> {
    prop_oneof![
        3 => stmt().prop_map(CallerStmt::Stmt),
        1 => Just(CallerStmt::Helper),
    ]
}

fn caller_json(s: &CallerStmt) -> Value {
    match s {
        CallerStmt::Stmt(s) => stmt_json(s),
        CallerStmt::Helper => call_stmt(ident("_h"), vec![]),
    }
}

fn build(body: &Value) -> FunctionSsa {
    FunctionSsa::build(Some(NodeRef::new(body)), &CallContext::default())
}

/// Non-phi definition versions per variable, in block order
fn def_versions(ssa: &FunctionSsa) -> BTreeMap<String, Vec<u32>> {
    non_phi_defs(ssa.blocks.iter().flat_map(|b| b.instructions.iter()))
}

fn non_phi_defs<'a>(instructions: impl Iterator<Item = &'a Instruction>) -> BTreeMap<String, Vec<u32>> {
    let mut versions: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for instruction in instructions {
        if instruction.is_phi() {
            continue;
        }
        for def in instruction.defs() {
            versions.entry(def.name.clone()).or_default().push(def.version);
        }
    }
    versions
}

proptest! {
    #[test]
    fn prop_straight_line_versions_are_dense(
        program in prop::collection::vec(simple(), 1..20)
    ) {
        let body = block(program.iter().map(simple_json).collect());
        let ssa = build(&body);

        for (name, versions) in def_versions(&ssa) {
            let expected: Vec<u32> = (1..=versions.len() as u32).collect();
            prop_assert_eq!(versions, expected, "versions of {}", name);
        }
    }

    #[test]
    fn prop_non_phi_versions_strictly_increase(
        program in prop::collection::vec(stmt(), 1..10)
    ) {
        let body = block(program.iter().map(stmt_json).collect());
        let ssa = build(&body);

        for (name, versions) in def_versions(&ssa) {
            prop_assert!(versions[0] >= 1, "{} starts at {}", name, versions[0]);
            prop_assert!(
                versions.windows(2).all(|w| w[0] < w[1]),
                "{} not increasing: {:?}", name, versions
            );
        }
    }

    #[test]
    fn prop_inlined_entrypoint_versions_strictly_increase(
        program in prop::collection::vec(caller_stmt(), 1..10),
        helper in prop::collection::vec(simple(), 1..4),
        depth in 0..3usize,
    ) {
        let entry = function("entry", "external", vec![], program.iter().map(caller_json).collect());
        let h = function("_h", "internal", vec![], helper.iter().map(simple_json).collect());
        let unit = source_unit(vec![contract("Prop", vec![entry, h])]);
        let analyses = analyze_with(&unit, &AnalysisConfig::default().inline_depth(depth));
        let finished = analyses[0].summary.entrypoint("entry").unwrap();

        let defs = non_phi_defs(finished.ssa.iter().flat_map(|b| b.instructions.iter()));
        for (name, versions) in defs {
            prop_assert!(versions[0] >= 1, "{} starts at {}", name, versions[0]);
            prop_assert!(
                versions.windows(2).all(|w| w[0] < w[1]),
                "{} not increasing: {:?}", name, versions
            );
        }
    }

    #[test]
    fn prop_ir_split_matches_statement_blocks(
        program in prop::collection::vec(simple(), 1..20)
    ) {
        let body = block(program.iter().map(simple_json).collect());
        let view = NodeRef::new(&body);
        let mut ids = BlockIdAllocator::new();
        let oracle = build_blocks(classify_statements(view.body_statements()), &mut ids);

        let mut ssa = build(&body);
        let split = ssa.finish("prop");
        prop_assert_eq!(split.len(), oracle.len());
    }

    #[test]
    fn prop_diamond_merges_both_arms(
        var in 0..3usize,
        prefix in any::<bool>(),
        then_value in 0..100u32,
        else_value in 0..100u32,
    ) {
        let v = VARS[var];
        let mut statements = Vec::new();
        if prefix {
            statements.push(assign(ident(v), "=", number("7")));
        }
        statements.push(if_else(
            ident("cond"),
            vec![assign(ident(v), "=", number(&then_value.to_string()))],
            Some(vec![assign(ident(v), "=", number(&else_value.to_string()))]),
        ));
        statements.push(assign(ident("out"), "=", ident(v)));
        let ssa = build(&block(statements));

        let base = u32::from(prefix);
        let merge = ssa.blocks.last().unwrap();
        let phi = merge.instructions.iter().find(|i| i.is_phi()).unwrap();
        match phi {
            Instruction::Phi { dest, sources } => {
                prop_assert_eq!(dest.version, base + 3);
                let merged: Vec<u32> = sources.iter().map(|(_, s)| s.version).collect();
                prop_assert_eq!(merged, vec![base + 1, base + 2]);
            }
            other => prop_assert!(false, "expected phi, got {}", other),
        }
        let read = merge.instructions.last().unwrap().to_string();
        prop_assert_eq!(read, format!("out_1 = {}_{}", v, base + 3));
    }
}
