//! Compiler AST fixture builders
//!
//! Shapes follow `solc --ast-compact-json`; only the fields the pipeline
//! reads are filled in.

use serde_json::{json, Value};

use solgraph_ir::config::AnalysisConfig;
use solgraph_ir::pipeline::{analyze_source_unit, ContractAnalysis};
use solgraph_ir::shared::models::AstNode;

// ───────────────────────────── expressions ─────────────────────────────

pub fn ident(name: &str) -> Value {
    json!({"nodeType": "Identifier", "name": name, "src": "0:0:0"})
}

pub fn typed_ident(name: &str, type_string: &str) -> Value {
    json!({"nodeType": "Identifier", "name": name, "src": "0:0:0",
           "typeDescriptions": {"typeString": type_string}})
}

pub fn number(value: &str) -> Value {
    json!({"nodeType": "Literal", "kind": "number", "value": value})
}

pub fn string_lit(value: &str) -> Value {
    json!({"nodeType": "Literal", "kind": "string", "value": value})
}

pub fn member(base: Value, name: &str) -> Value {
    json!({"nodeType": "MemberAccess", "memberName": name, "expression": base})
}

pub fn index(base: Value, key: Value) -> Value {
    json!({"nodeType": "IndexAccess", "baseExpression": base, "indexExpression": key})
}

pub fn binary(lhs: Value, op: &str, rhs: Value) -> Value {
    json!({"nodeType": "BinaryOperation", "operator": op,
           "leftExpression": lhs, "rightExpression": rhs})
}

pub fn call(callee: Value, args: Vec<Value>) -> Value {
    json!({"nodeType": "FunctionCall", "kind": "functionCall", "src": "0:0:0",
           "expression": callee, "arguments": args})
}

/// `IVault(addr)`
pub fn cast(type_name: &str, value: Value) -> Value {
    json!({"nodeType": "FunctionCall", "kind": "typeConversion",
           "expression": ident(type_name), "arguments": [value]})
}

/// `callee{value: v}(args)`
pub fn call_with_value(callee: Value, value: Value, args: Vec<Value>) -> Value {
    let options = json!({"nodeType": "FunctionCallOptions", "names": ["value"],
                         "options": [value], "expression": callee});
    call(options, args)
}

pub fn msg_sender() -> Value {
    member(ident("msg"), "sender")
}

// ───────────────────────────── statements ─────────────────────────────

pub fn expr_stmt(expression: Value) -> Value {
    json!({"nodeType": "ExpressionStatement", "expression": expression})
}

pub fn assign(lhs: Value, op: &str, rhs: Value) -> Value {
    expr_stmt(json!({"nodeType": "Assignment", "operator": op,
                     "leftHandSide": lhs, "rightHandSide": rhs}))
}

pub fn call_stmt(callee: Value, args: Vec<Value>) -> Value {
    expr_stmt(call(callee, args))
}

pub fn declare(name: &str, type_string: &str, value: Option<Value>) -> Value {
    let declaration = json!({"nodeType": "VariableDeclaration", "name": name,
                             "typeDescriptions": {"typeString": type_string}});
    match value {
        Some(v) => json!({"nodeType": "VariableDeclarationStatement",
                          "declarations": [declaration], "initialValue": v}),
        None => json!({"nodeType": "VariableDeclarationStatement", "declarations": [declaration]}),
    }
}

pub fn block(statements: Vec<Value>) -> Value {
    json!({"nodeType": "Block", "statements": statements})
}

pub fn if_else(condition: Value, then: Vec<Value>, otherwise: Option<Vec<Value>>) -> Value {
    match otherwise {
        Some(o) => json!({"nodeType": "IfStatement", "condition": condition,
                          "trueBody": block(then), "falseBody": block(o)}),
        None => json!({"nodeType": "IfStatement", "condition": condition, "trueBody": block(then)}),
    }
}

pub fn while_loop(condition: Value, body: Vec<Value>) -> Value {
    json!({"nodeType": "WhileStatement", "condition": condition, "body": block(body)})
}

pub fn ret(value: Option<Value>) -> Value {
    match value {
        Some(v) => json!({"nodeType": "Return", "expression": v}),
        None => json!({"nodeType": "Return"}),
    }
}

pub fn require(condition: Value, message: &str) -> Value {
    call_stmt(ident("require"), vec![condition, string_lit(message)])
}

pub fn revert(message: &str) -> Value {
    call_stmt(ident("revert"), vec![string_lit(message)])
}

// ───────────────────────────── declarations ─────────────────────────────

pub fn param(name: &str, type_string: &str) -> Value {
    json!({"nodeType": "VariableDeclaration", "name": name,
           "typeDescriptions": {"typeString": type_string}})
}

pub fn state_var(name: &str, type_string: &str, src: &str) -> Value {
    json!({"nodeType": "VariableDeclaration", "name": name, "stateVariable": true,
           "src": src, "typeDescriptions": {"typeString": type_string}})
}

pub fn function(name: &str, visibility: &str, params: Vec<Value>, body: Vec<Value>) -> Value {
    json!({"nodeType": "FunctionDefinition", "name": name, "kind": "function",
           "visibility": visibility, "src": "0:0:0",
           "parameters": {"nodeType": "ParameterList", "parameters": params},
           "modifiers": [],
           "body": block(body)})
}

pub fn with_src(mut node: Value, src: &str) -> Value {
    node["src"] = json!(src);
    node
}

pub fn with_modifier(mut function: Value, modifier: &str) -> Value {
    function["modifiers"] = json!([{"nodeType": "ModifierInvocation",
        "modifierName": {"nodeType": "IdentifierPath", "name": modifier}}]);
    function
}

pub fn contract(name: &str, nodes: Vec<Value>) -> Value {
    json!({"nodeType": "ContractDefinition", "name": name, "src": "0:0:0", "nodes": nodes})
}

pub fn source_unit(contracts: Vec<Value>) -> AstNode {
    let mut nodes = vec![json!({"nodeType": "PragmaDirective",
                                "literals": ["solidity", "^", "0.8", ".0"]})];
    nodes.extend(contracts);
    AstNode::new(json!({"nodeType": "SourceUnit", "nodes": nodes}))
}

/// Foundry artifact wrapper
pub fn artifact_json(unit: &AstNode) -> String {
    json!({"abi": [], "ast": unit.raw()}).to_string()
}

// ───────────────────────────── runners ─────────────────────────────

/// One contract holding `balances` and `x`, plus the given functions
pub fn bank(functions: Vec<Value>) -> AstNode {
    let mut nodes = vec![
        state_var("balances", "mapping(address => uint256)", "20:40:0"),
        state_var("x", "uint256", "70:10:0"),
    ];
    nodes.extend(functions);
    source_unit(vec![contract("Bank", nodes)])
}

pub fn analyze(unit: &AstNode) -> Vec<ContractAnalysis> {
    analyze_with(unit, &AnalysisConfig::default())
}

pub fn analyze_with(unit: &AstNode, config: &AnalysisConfig) -> Vec<ContractAnalysis> {
    analyze_source_unit(unit, config)
}

/// Rendered SSA of an entrypoint, block by block
pub fn ssa_lines(analysis: &ContractAnalysis, function: &str) -> Vec<Vec<String>> {
    analysis
        .summary
        .entrypoint(function)
        .map(|f| {
            f.ssa
                .iter()
                .map(|b| b.instructions.iter().map(|i| i.to_string()).collect())
                .collect()
        })
        .unwrap_or_default()
}

/// `msg.sender.call{value: amount}("")`
pub fn send_ether(amount: &str) -> Value {
    expr_stmt(call_with_value(member(msg_sender(), "call"), ident(amount), vec![string_lit("")]))
}
