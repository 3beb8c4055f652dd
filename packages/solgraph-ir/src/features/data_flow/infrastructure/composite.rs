//! Composite variable names
//!
//! A storage location expression maps to its access path, from the root
//! identifier down to the full composite:
//!   balances[msg.sender]      -> [balances, balances[msg.sender]]
//!   allowance[a][b]           -> [allowance, allowance[a], allowance[a][b]]
//!   position.owner            -> [position, position.owner]

use crate::features::parsing::infrastructure::expression_text;
use crate::shared::models::{NodeRef, NodeType};

/// Expression that denotes a storage/memory location
pub fn is_location(node: NodeRef<'_>) -> bool {
    match node.node_type() {
        NodeType::Identifier => true,
        NodeType::MemberAccess => node.child("expression").map_or(false, is_location),
        NodeType::IndexAccess => node.child("baseExpression").map_or(false, is_location),
        _ => false,
    }
}

/// Access path of a location; empty for non-locations
pub fn access_path(node: NodeRef<'_>) -> Vec<String> {
    let mut path = Vec::new();
    collect_path(node, &mut path);
    path
}

fn collect_path(node: NodeRef<'_>, path: &mut Vec<String>) {
    match node.node_type() {
        NodeType::Identifier => path.push(node.name().to_string()),
        NodeType::MemberAccess => {
            if let Some(base) = node.child("expression").filter(|b| is_location(*b)) {
                collect_path(base, path);
                path.push(expression_text(node));
            }
        }
        NodeType::IndexAccess => {
            if let Some(base) = node.child("baseExpression").filter(|b| is_location(*b)) {
                collect_path(base, path);
                path.push(expression_text(node));
            }
        }
        _ => {}
    }
}

/// Full composite name of a location (`m[k]`), or its text otherwise
pub fn composite_name(node: NodeRef<'_>) -> String {
    access_path(node)
        .pop()
        .unwrap_or_else(|| expression_text(node))
}

/// Counter idioms inside a loop body: `i++`, `i--`, `x = x + 1`,
/// `x = x - 1`, `x += 1`, `x -= 1`. Nested statements are searched too.
pub fn loop_counters(body: NodeRef<'_>) -> Vec<String> {
    let mut found = Vec::new();
    scan_counters(body, &mut found);
    found
}

fn is_one(node: Option<NodeRef<'_>>) -> bool {
    node.map_or(false, |n| n.is(NodeType::Literal) && n.str_field("value") == "1")
}

fn scan_counters(node: NodeRef<'_>, found: &mut Vec<String>) {
    match node.node_type() {
        NodeType::UnaryOperation => {
            let op = node.str_field("operator");
            if op == "++" || op == "--" {
                if let Some(sub) = node.child("subExpression").filter(|s| is_location(*s)) {
                    found.push(composite_name(sub));
                }
            }
        }
        NodeType::Assignment => {
            if let Some(lhs) = node.child("leftHandSide").filter(|l| is_location(*l)) {
                let target = composite_name(lhs);
                let rhs = node.child("rightHandSide");
                let matched = match node.str_field("operator") {
                    "+=" | "-=" => is_one(rhs),
                    "=" => rhs
                        .filter(|r| r.is(NodeType::BinaryOperation))
                        .map_or(false, |r| {
                            matches!(r.str_field("operator"), "+" | "-")
                                && r.child("leftExpression")
                                    .map_or(false, |l| is_location(l) && composite_name(l) == target)
                                && is_one(r.child("rightExpression"))
                        }),
                    _ => false,
                };
                if matched {
                    found.push(target);
                }
            }
        }
        _ => {}
    }

    // Walk every object-valued child and array element
    if let Some(map) = node.raw().as_object() {
        for value in map.values() {
            match value {
                serde_json::Value::Object(_) => scan_counters(NodeRef::new(value), found),
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter(|v| v.is_object())
                    .for_each(|v| scan_counters(NodeRef::new(v), found)),
                _ => {}
            }
        }
    }
}
