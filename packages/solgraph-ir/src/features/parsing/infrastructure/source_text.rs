//! Render AST expressions back to Solidity-like text
//!
//! Used for composite variable names (`m[msg.sender]`), call names
//! (`IA(a).hello`), branch conditions and statement display. Formatting is
//! canonical, not a copy of the original source bytes.

use crate::shared::models::{NodeRef, NodeType};

pub fn expression_text(node: NodeRef<'_>) -> String {
    match node.node_type() {
        NodeType::Identifier => node.name().to_string(),
        NodeType::MemberAccess => {
            let base = node.child("expression").map(expression_text).unwrap_or_default();
            format!("{}.{}", base, node.str_field("memberName"))
        }
        NodeType::IndexAccess => {
            let base = node.child("baseExpression").map(expression_text).unwrap_or_default();
            let index = node.child("indexExpression").map(expression_text).unwrap_or_default();
            format!("{base}[{index}]")
        }
        NodeType::IndexRangeAccess => {
            let base = node.child("baseExpression").map(expression_text).unwrap_or_default();
            let start = node.child("startExpression").map(expression_text).unwrap_or_default();
            let end = node.child("endExpression").map(expression_text).unwrap_or_default();
            format!("{base}[{start}:{end}]")
        }
        NodeType::Literal => literal_text(node),
        NodeType::BinaryOperation => format!(
            "{} {} {}",
            node.child("leftExpression").map(expression_text).unwrap_or_default(),
            node.str_field("operator"),
            node.child("rightExpression").map(expression_text).unwrap_or_default()
        ),
        NodeType::Assignment => format!(
            "{} {} {}",
            node.child("leftHandSide").map(expression_text).unwrap_or_default(),
            node.str_field("operator"),
            node.child("rightHandSide").map(expression_text).unwrap_or_default()
        ),
        NodeType::UnaryOperation => {
            let operand = node.child("subExpression").map(expression_text).unwrap_or_default();
            let op = node.str_field("operator");
            if op == "delete" {
                format!("delete {operand}")
            } else if node.bool_field("prefix") {
                format!("{op}{operand}")
            } else {
                format!("{operand}{op}")
            }
        }
        NodeType::FunctionCall => {
            let callee = node.child("expression").map(expression_text).unwrap_or_default();
            format!("{}({})", callee, call_arguments_text(node))
        }
        NodeType::FunctionCallOptions => {
            let callee = node.child("expression").map(expression_text).unwrap_or_default();
            let names = node.field("names");
            let names: Vec<&str> = names
                .raw()
                .as_array()
                .map(|a| a.iter().filter_map(|n| n.as_str()).collect())
                .unwrap_or_default();
            let options: Vec<String> = names
                .iter()
                .zip(node.children("options"))
                .map(|(name, value)| format!("{}: {}", name, expression_text(value)))
                .collect();
            format!("{}{{{}}}", callee, options.join(", "))
        }
        NodeType::TupleExpression => {
            let parts: Vec<String> = node
                .items_of("components")
                .into_iter()
                .map(|c| c.map(expression_text).unwrap_or_default())
                .collect();
            if node.bool_field("isInlineArray") {
                format!("[{}]", parts.join(", "))
            } else {
                format!("({})", parts.join(", "))
            }
        }
        NodeType::Conditional => format!(
            "{} ? {} : {}",
            node.child("condition").map(expression_text).unwrap_or_default(),
            node.child("trueExpression").map(expression_text).unwrap_or_default(),
            node.child("falseExpression").map(expression_text).unwrap_or_default()
        ),
        NodeType::ElementaryTypeNameExpression => match node.child("typeName") {
            Some(type_name) => type_name_text(type_name),
            // pre-0.6 compilers store the name as a plain string
            None => node.str_field("typeName").to_string(),
        },
        NodeType::NewExpression => format!(
            "new {}",
            node.child("typeName").map(type_name_text).unwrap_or_default()
        ),
        _ => String::new(),
    }
}

/// `a, b` or `{to: a, amount: b}` for named arguments
pub fn call_arguments_text(call: NodeRef<'_>) -> String {
    let args: Vec<String> = call.children("arguments").into_iter().map(expression_text).collect();
    let names: Vec<&str> = call
        .field("names")
        .raw()
        .as_array()
        .map(|a| a.iter().filter_map(|n| n.as_str()).collect())
        .unwrap_or_default();
    if !names.is_empty() && names.len() == args.len() {
        let pairs: Vec<String> = names
            .iter()
            .zip(&args)
            .map(|(name, arg)| format!("{name}: {arg}"))
            .collect();
        format!("{{{}}}", pairs.join(", "))
    } else {
        args.join(", ")
    }
}

fn literal_text(node: NodeRef<'_>) -> String {
    let value = node.str_field("value");
    let hex = node.str_field("hexValue");
    let value = if node.field("value").raw().is_null() && !hex.is_empty() {
        // non-UTF8 strings only carry hexValue
        format!("hex\"{hex}\"")
    } else if node.str_field("kind") == "string" || node.str_field("kind") == "unicodeString" {
        format!("\"{value}\"")
    } else {
        value.to_string()
    };
    match node.field("subdenomination").raw().as_str() {
        Some(unit) if !unit.is_empty() => format!("{value} {unit}"),
        _ => value,
    }
}

pub fn type_name_text(node: NodeRef<'_>) -> String {
    match node.node_type_str() {
        "ElementaryTypeName" => node.name().to_string(),
        "UserDefinedTypeName" => {
            let path = node.field("pathNode").name();
            if path.is_empty() {
                node.name().to_string()
            } else {
                path.to_string()
            }
        }
        "ArrayTypeName" => {
            let base = node.child("baseType").map(type_name_text).unwrap_or_default();
            let len = node.child("length").map(expression_text).unwrap_or_default();
            format!("{base}[{len}]")
        }
        "Mapping" => format!(
            "mapping({} => {})",
            node.child("keyType").map(type_name_text).unwrap_or_default(),
            node.child("valueType").map(type_name_text).unwrap_or_default()
        ),
        _ => node.type_string().to_string(),
    }
}

/// One-line rendering of a statement for reports and debugging
pub fn statement_text(node: NodeRef<'_>) -> String {
    match node.node_type() {
        NodeType::ExpressionStatement => {
            node.child("expression").map(expression_text).unwrap_or_default()
        }
        NodeType::VariableDeclarationStatement => {
            let decls: Vec<String> = node
                .items_of("declarations")
                .into_iter()
                .map(|d| match d {
                    Some(d) => {
                        let ty = d.child("typeName").map(type_name_text).unwrap_or_default();
                        if ty.is_empty() {
                            d.name().to_string()
                        } else {
                            format!("{} {}", ty, d.name())
                        }
                    }
                    None => String::new(),
                })
                .collect();
            let lhs = if decls.len() == 1 {
                decls[0].clone()
            } else {
                format!("({})", decls.join(", "))
            };
            match node.child("initialValue") {
                Some(init) => format!("{} = {}", lhs, expression_text(init)),
                None => lhs,
            }
        }
        NodeType::EmitStatement => format!(
            "emit {}",
            node.child("eventCall").map(expression_text).unwrap_or_default()
        ),
        NodeType::RevertStatement => format!(
            "revert {}",
            node.child("errorCall").map(expression_text).unwrap_or_default()
        ),
        NodeType::Return => match node.child("expression") {
            Some(expr) => format!("return {}", expression_text(expr)),
            None => "return".to_string(),
        },
        NodeType::IfStatement => format!(
            "if ({})",
            node.child("condition").map(expression_text).unwrap_or_default()
        ),
        NodeType::ForStatement => format!(
            "for ({}; {}; {})",
            node.child("initializationExpression").map(statement_text).unwrap_or_default(),
            node.child("condition").map(expression_text).unwrap_or_default(),
            node.child("loopExpression").map(statement_text).unwrap_or_default()
        ),
        NodeType::WhileStatement => format!(
            "while ({})",
            node.child("condition").map(expression_text).unwrap_or_default()
        ),
        NodeType::DoWhileStatement => format!(
            "do while ({})",
            node.child("condition").map(expression_text).unwrap_or_default()
        ),
        NodeType::TryStatement => format!(
            "try {}",
            node.child("externalCall").map(expression_text).unwrap_or_default()
        ),
        NodeType::Block | NodeType::UncheckedBlock => {
            let inner: Vec<String> = node.children("statements").into_iter().map(statement_text).collect();
            format!("{{ {} }}", inner.join("; "))
        }
        NodeType::Break => "break".to_string(),
        NodeType::Continue => "continue".to_string(),
        NodeType::PlaceholderStatement => "_".to_string(),
        NodeType::InlineAssembly => "assembly { ... }".to_string(),
        _ => node.node_type_str().to_string(),
    }
}
