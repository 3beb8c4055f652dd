/*
 * Call Classifier
 *
 * Decides, per call expression, where control goes:
 *   require/assert/revert            -> Revert
 *   f(..)  with f defined here       -> Internal
 *   keccak256(..), gasleft(), ...    -> Builtin
 *   g(..)  otherwise                 -> External
 *   x.call / x.send / x.transfer     -> LowLevelExternal
 *   x.delegatecall / x.staticcall    -> Delegatecall / Staticcall
 *   c.f(..) on a contract/interface  -> External
 *   anything else                    -> Builtin
 */

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;

use crate::features::interprocedural::domain::CallType;
use crate::features::parsing::infrastructure::expression_text;
use crate::shared::models::{NodeRef, NodeType};

static REVERT_FAMILY: Lazy<BTreeSet<&'static str>> =
    Lazy::new(|| ["require", "assert", "revert"].into_iter().collect());

static BUILTIN_FUNCTIONS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        "keccak256",
        "sha256",
        "sha3",
        "ripemd160",
        "ecrecover",
        "addmod",
        "mulmod",
        "gasleft",
        "blockhash",
        "blobhash",
        "selfdestruct",
        "suicide",
        "type",
    ]
    .into_iter()
    .collect()
});

/// What the classifier knows about the enclosing contract and function
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Functions (and modifiers) defined in the contract
    pub functions: BTreeSet<String>,
    /// Variable name -> declared type string (state vars, params, locals)
    pub symbols: BTreeMap<String, String>,
}

impl CallContext {
    pub fn new(functions: BTreeSet<String>, symbols: BTreeMap<String, String>) -> Self {
        Self { functions, symbols }
    }

    pub fn with_symbols(&self, extra: BTreeMap<String, String>) -> Self {
        let mut symbols = self.symbols.clone();
        symbols.extend(extra);
        Self {
            functions: self.functions.clone(),
            symbols,
        }
    }

    fn declared_type(&self, node: NodeRef<'_>) -> String {
        let from_ast = node.type_string();
        if !from_ast.is_empty() {
            return from_ast.to_string();
        }
        self.symbols
            .get(&expression_text(node))
            .cloned()
            .unwrap_or_default()
    }
}

/// Conversions (`address(x)`, `IA(a)`) are not calls
pub fn is_type_conversion(call: NodeRef<'_>) -> bool {
    call.str_field("kind") == "typeConversion"
        || call
            .child("expression")
            .map_or(false, |c| c.is(NodeType::ElementaryTypeNameExpression))
}

pub fn is_struct_constructor(call: NodeRef<'_>) -> bool {
    call.str_field("kind") == "structConstructorCall"
}

/// Callee with `{value: ..}` options peeled off
pub fn callee_of(call: NodeRef<'_>) -> Option<NodeRef<'_>> {
    let mut callee = call.child("expression")?;
    while callee.is(NodeType::FunctionCallOptions) {
        callee = callee.child("expression")?;
    }
    Some(callee)
}

/// Name shown for the call: the callee's source text (`msg.sender.call`, `IA(a).hello`)
pub fn call_name(call: NodeRef<'_>) -> String {
    callee_of(call).map(expression_text).unwrap_or_default()
}

pub fn classify_call(call: NodeRef<'_>, ctx: &CallContext) -> CallType {
    let Some(callee) = callee_of(call) else {
        return CallType::Builtin;
    };
    match callee.node_type() {
        NodeType::Identifier => classify_identifier(callee, ctx),
        NodeType::MemberAccess => classify_member(callee, ctx),
        _ => CallType::Builtin,
    }
}

fn classify_identifier(callee: NodeRef<'_>, ctx: &CallContext) -> CallType {
    let name = callee.name();
    if REVERT_FAMILY.contains(name) {
        CallType::Revert
    } else if ctx.functions.contains(name) {
        CallType::Internal
    } else if callee.i64_field("referencedDeclaration").map_or(false, |id| id < 0)
        || BUILTIN_FUNCTIONS.contains(name)
    {
        CallType::Builtin
    } else {
        CallType::External
    }
}

fn classify_member(callee: NodeRef<'_>, ctx: &CallContext) -> CallType {
    match callee.str_field("memberName") {
        "call" | "send" | "transfer" => return CallType::LowLevelExternal,
        "delegatecall" => return CallType::Delegatecall,
        "staticcall" => return CallType::Staticcall,
        _ => {}
    }
    let Some(receiver) = callee.child("expression") else {
        return CallType::Builtin;
    };

    if receiver.is(NodeType::Identifier) {
        match receiver.name() {
            "this" => return CallType::External,
            "super" if ctx.functions.contains(callee.str_field("memberName")) => {
                return CallType::Internal
            }
            _ => {}
        }
    }

    let ty = ctx.declared_type(receiver);
    if ty.contains("contract") || ty.contains("interface") {
        return CallType::External;
    }
    if receiver.is(NodeType::FunctionCall) && is_contract_cast(receiver, ctx) {
        return CallType::External;
    }
    CallType::Builtin
}

/// `IA(a)`: conversion to a user-defined (contract) type
fn is_contract_cast(call: NodeRef<'_>, ctx: &CallContext) -> bool {
    let Some(target) = call.child("expression") else {
        return false;
    };
    if !target.is(NodeType::Identifier) || ctx.functions.contains(target.name()) {
        return false;
    }
    match call.str_field("kind") {
        "typeConversion" => true,
        // hand-written ASTs without `kind`: conversions name a type
        "" => target.name().starts_with(|c: char| c.is_ascii_uppercase()),
        _ => false,
    }
}
