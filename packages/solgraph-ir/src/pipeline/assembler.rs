//! Function & contract assembler
//!
//! Two passes per contract:
//! 1. every implemented function -> standalone SSA; its blocks become the
//!    inlining template for internal callers
//! 2. every entrypoint (public/external with a body) -> fresh copy of its
//!    standalone SSA, internal calls inlined, split, validated
//!
//! The detector then runs over each entrypoint's finished blocks.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, trace};

use super::types::{ContractAnalysis, ContractSummary, EventInfo, FunctionInfo, FunctionSummary, StateVar};
use crate::config::AnalysisConfig;
use crate::features::interprocedural::infrastructure::{CallContext, InlineTemplate, Inliner};
use crate::features::parsing::infrastructure::type_name_text;
use crate::features::reentrancy::infrastructure::FunctionView;
use crate::features::ssa::application::FunctionSsa;
use crate::shared::models::{NodeRef, NodeType};

const ENTRYPOINT_VISIBILITY: &[&str] = &["public", "external"];

/// A function definition with its resolved name
#[derive(Debug, Clone, Copy)]
struct FunctionDef<'a> {
    name: &'a str,
    node: NodeRef<'a>,
}

impl<'a> FunctionDef<'a> {
    fn new(node: NodeRef<'a>) -> Self {
        // constructor / fallback / receive have no name
        let name = match node.name() {
            "" => node.str_field("kind"),
            name => name,
        };
        Self { name, node }
    }

    fn visibility(&self) -> &'a str {
        self.node.str_field("visibility")
    }

    fn body(&self) -> Option<NodeRef<'a>> {
        self.node.child("body")
    }

    fn is_entrypoint(&self) -> bool {
        ENTRYPOINT_VISIBILITY.contains(&self.visibility()) && self.body().is_some()
    }

    fn params(&self) -> Vec<String> {
        self.node
            .field("parameters")
            .children("parameters")
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    fn modifiers(&self) -> Vec<String> {
        self.node
            .children("modifiers")
            .iter()
            .map(|m| m.field("modifierName").name().to_string())
            .filter(|n| !n.is_empty())
            .collect()
    }

    /// Parameters, return variables and locals with their declared types
    fn symbols(&self) -> BTreeMap<String, String> {
        let mut symbols = BTreeMap::new();
        collect_declarations(self.node.raw(), &mut symbols);
        symbols
    }
}

fn collect_declarations(value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            let node = NodeRef::new(value);
            if node.is(NodeType::VariableDeclaration) && !node.name().is_empty() {
                out.insert(node.name().to_string(), declared_type(node));
            }
            map.values().for_each(|v| collect_declarations(v, out));
        }
        Value::Array(items) => items.iter().for_each(|v| collect_declarations(v, out)),
        _ => {}
    }
}

fn declared_type(node: NodeRef<'_>) -> String {
    match node.type_string() {
        "" => type_name_text(node.field("typeName")),
        ts => ts.to_string(),
    }
}

pub struct ContractAssembler<'c> {
    config: &'c AnalysisConfig,
}

impl<'c> ContractAssembler<'c> {
    pub fn new(config: &'c AnalysisConfig) -> Self {
        Self { config }
    }

    /// Summarize one `ContractDefinition` and run the detector on it
    pub fn analyze(&self, contract: NodeRef<'_>, pragma: &str) -> ContractAnalysis {
        let summary = self.assemble(contract, pragma);
        let state_names: BTreeSet<String> =
            summary.state_vars.iter().map(|v| v.name.clone()).collect();
        let detector = self.config.detector();

        let findings = summary
            .entrypoints
            .iter()
            .filter_map(|f| {
                let view = FunctionView {
                    contract: &summary.name,
                    name: &f.name,
                    modifiers: &f.modifiers,
                    blocks: &f.ssa,
                };
                detector.check_function(&view, &state_names)
            })
            .collect();

        ContractAnalysis { summary, findings }
    }

    pub fn assemble(&self, contract: NodeRef<'_>, pragma: &str) -> ContractSummary {
        let name = contract.name().to_string();
        let members = contract.children("nodes");

        let mut state_vars = Vec::new();
        let mut functions = BTreeMap::new();
        let mut events = Vec::new();
        let mut defs = Vec::new();
        let mut callable = BTreeSet::new();
        let mut state_symbols = BTreeMap::new();

        for member in &members {
            match member.node_type() {
                NodeType::VariableDeclaration => {
                    let type_name = declared_type(*member);
                    state_symbols.insert(member.name().to_string(), type_name.clone());
                    state_vars.push(StateVar {
                        name: member.name().to_string(),
                        type_name,
                        location: member.src(),
                    });
                }
                NodeType::FunctionDefinition => {
                    let def = FunctionDef::new(*member);
                    functions.insert(
                        def.name.to_string(),
                        FunctionInfo {
                            visibility: def.visibility().to_string(),
                            location: member.src(),
                        },
                    );
                    callable.insert(def.name.to_string());
                    defs.push(def);
                }
                NodeType::ModifierDefinition => {
                    callable.insert(member.name().to_string());
                }
                NodeType::EventDefinition => events.push(EventInfo {
                    name: member.name().to_string(),
                    location: member.src(),
                }),
                _ => {}
            }
        }

        let contract_ctx = CallContext::new(callable, state_symbols);

        // Pass 1: standalone SSA for every implemented function
        let mut standalone: BTreeMap<&str, FunctionSsa> = BTreeMap::new();
        let mut templates: BTreeMap<String, InlineTemplate> = BTreeMap::new();
        for def in defs.iter() {
            let Some(body) = def.body() else { continue };
            let ctx = contract_ctx.with_symbols(def.symbols());
            let ssa = FunctionSsa::build(Some(body), &ctx);
            trace!(contract = %name, function = def.name, blocks = ssa.blocks.len(), "standalone SSA");
            templates.insert(
                def.name.to_string(),
                InlineTemplate::from_blocks(def.params(), &ssa.blocks),
            );
            standalone.insert(def.name, ssa);
        }

        // Pass 2: entrypoints with internal calls inlined
        let inliner = Inliner::new(&templates, self.config.inline_depth);
        let mut entrypoints = Vec::new();
        for def in defs.iter().filter(|d| d.is_entrypoint()) {
            let Some(mut ssa) = standalone.get(def.name).cloned() else { continue };
            let spliced = ssa.inline(&inliner, def.name);
            let finished = ssa.finish(def.name);
            debug!(
                contract = %name,
                function = def.name,
                blocks = finished.len(),
                spliced,
                "entrypoint"
            );
            entrypoints.push(FunctionSummary {
                name: def.name.to_string(),
                visibility: def.visibility().to_string(),
                location: def.node.src(),
                body_raw: def.body().map(|b| b.to_owned_node()),
                modifiers: def.modifiers(),
                blocks: ssa.blocks,
                ssa: finished,
                calls: ssa.calls,
            });
        }

        ContractSummary {
            name,
            pragma: pragma.to_string(),
            state_vars,
            functions,
            events,
            entrypoints,
        }
    }
}
