//! Typed view over the compiler's JSON AST
//!
//! The compiler AST schema is versioned outside this crate, so every
//! accessor defaults instead of failing: a missing string is `""`, a missing
//! child list is empty, an unknown `nodeType` is [`NodeType::Unknown`].
//!
//! [`AstNode`] owns a subtree (one statement, one function body) and is what
//! the pipeline stores. [`NodeRef`] is the cheap borrowed view the walkers use.

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::SourceLocation;

/// Node kinds the pipeline inspects (`nodeType` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    SourceUnit,
    PragmaDirective,
    ContractDefinition,
    FunctionDefinition,
    ModifierDefinition,
    ModifierInvocation,
    EventDefinition,
    VariableDeclaration,
    ParameterList,
    Block,
    UncheckedBlock,
    ExpressionStatement,
    VariableDeclarationStatement,
    EmitStatement,
    IfStatement,
    ForStatement,
    WhileStatement,
    DoWhileStatement,
    Return,
    RevertStatement,
    TryStatement,
    TryCatchClause,
    InlineAssembly,
    Break,
    Continue,
    PlaceholderStatement,
    Assignment,
    BinaryOperation,
    UnaryOperation,
    Conditional,
    FunctionCall,
    FunctionCallOptions,
    MemberAccess,
    IndexAccess,
    IndexRangeAccess,
    Identifier,
    Literal,
    TupleExpression,
    ElementaryTypeNameExpression,
    NewExpression,
    Unknown,
}

impl NodeType {
    pub fn from_str(s: &str) -> Self {
        match s {
            "SourceUnit" => Self::SourceUnit,
            "PragmaDirective" => Self::PragmaDirective,
            "ContractDefinition" => Self::ContractDefinition,
            "FunctionDefinition" => Self::FunctionDefinition,
            "ModifierDefinition" => Self::ModifierDefinition,
            "ModifierInvocation" => Self::ModifierInvocation,
            "EventDefinition" => Self::EventDefinition,
            "VariableDeclaration" => Self::VariableDeclaration,
            "ParameterList" => Self::ParameterList,
            "Block" => Self::Block,
            "UncheckedBlock" => Self::UncheckedBlock,
            "ExpressionStatement" => Self::ExpressionStatement,
            "VariableDeclarationStatement" => Self::VariableDeclarationStatement,
            "EmitStatement" => Self::EmitStatement,
            "IfStatement" => Self::IfStatement,
            "ForStatement" => Self::ForStatement,
            "WhileStatement" => Self::WhileStatement,
            "DoWhileStatement" => Self::DoWhileStatement,
            "Return" => Self::Return,
            "RevertStatement" => Self::RevertStatement,
            "TryStatement" => Self::TryStatement,
            "TryCatchClause" => Self::TryCatchClause,
            "InlineAssembly" => Self::InlineAssembly,
            "Break" => Self::Break,
            "Continue" => Self::Continue,
            "PlaceholderStatement" => Self::PlaceholderStatement,
            "Assignment" => Self::Assignment,
            "BinaryOperation" => Self::BinaryOperation,
            "UnaryOperation" => Self::UnaryOperation,
            "Conditional" => Self::Conditional,
            "FunctionCall" => Self::FunctionCall,
            "FunctionCallOptions" => Self::FunctionCallOptions,
            "MemberAccess" => Self::MemberAccess,
            "IndexAccess" => Self::IndexAccess,
            "IndexRangeAccess" => Self::IndexRangeAccess,
            "Identifier" => Self::Identifier,
            "Literal" => Self::Literal,
            "TupleExpression" => Self::TupleExpression,
            "ElementaryTypeNameExpression" => Self::ElementaryTypeNameExpression,
            "NewExpression" => Self::NewExpression,
            _ => Self::Unknown,
        }
    }
}

/// Owned AST subtree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AstNode {
    value: Value,
}

impl AstNode {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn view(&self) -> NodeRef<'_> {
        NodeRef::new(&self.value)
    }

    pub fn node_type(&self) -> NodeType {
        self.view().node_type()
    }

    pub fn raw(&self) -> &Value {
        &self.value
    }
}

impl From<Value> for AstNode {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl Serialize for AstNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Borrowed view of one AST node
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    value: &'a Value,
}

static NULL: Value = Value::Null;

impl<'a> NodeRef<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    pub fn raw(&self) -> &'a Value {
        self.value
    }

    pub fn to_owned_node(&self) -> AstNode {
        AstNode::new(self.value.clone())
    }

    /// True when the node is a JSON object (absent children are `null`)
    pub fn exists(&self) -> bool {
        self.value.is_object()
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::from_str(self.node_type_str())
    }

    pub fn node_type_str(&self) -> &'a str {
        self.str_field("nodeType")
    }

    pub fn is(&self, node_type: NodeType) -> bool {
        self.node_type() == node_type
    }

    /// Field lookup; a missing key yields a null view
    pub fn field(&self, key: &str) -> NodeRef<'a> {
        NodeRef::new(self.value.get(key).unwrap_or(&NULL))
    }

    /// Child object, `None` for missing or `null`
    pub fn child(&self, key: &str) -> Option<NodeRef<'a>> {
        self.value
            .get(key)
            .filter(|v| v.is_object())
            .map(NodeRef::new)
    }

    /// Child array with `null` entries dropped
    pub fn children(&self, key: &str) -> Vec<NodeRef<'a>> {
        self.items_of(key).into_iter().flatten().collect()
    }

    /// Child array keeping `null` holes (tuple components, declarations)
    pub fn items_of(&self, key: &str) -> Vec<Option<NodeRef<'a>>> {
        match self.value.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| if v.is_object() { Some(NodeRef::new(v)) } else { None })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn str_field(&self, key: &str) -> &'a str {
        self.value.get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn bool_field(&self, key: &str) -> bool {
        self.value.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn i64_field(&self, key: &str) -> Option<i64> {
        self.value.get(key).and_then(Value::as_i64)
    }

    pub fn name(&self) -> &'a str {
        self.str_field("name")
    }

    pub fn src(&self) -> SourceLocation {
        SourceLocation::parse(self.str_field("src"))
    }

    /// `typeDescriptions.typeString`, empty when the compiler omitted it
    pub fn type_string(&self) -> &'a str {
        self.field("typeDescriptions").str_field("typeString")
    }

    /// Statements of a `Block`/`UncheckedBlock`, or the node itself when it
    /// is a single statement (unbraced `if` bodies)
    pub fn body_statements(&self) -> Vec<NodeRef<'a>> {
        match self.node_type() {
            NodeType::Block | NodeType::UncheckedBlock => self.children("statements"),
            _ if self.exists() => vec![*self],
            _ => Vec::new(),
        }
    }
}
