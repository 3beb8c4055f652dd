/*
 * Inliner
 *
 * Splices the SSA body of internal callees after each internal call site,
 * keeping the call itself for traceability:
 * - parameters read at version 0 become the bound argument expressions
 * - parameter tokens inside composite names are rewritten
 *   (`balanceOf[to]` with to := recipient -> `balanceOf[recipient]`)
 * - callee reads at version 0 see the caller's current version
 * - phis and returns are not spliced
 *
 * Splicing re-versions the whole caller in block order with a fresh
 * context, so versions stay increasing in creation order and caller reads
 * after a call see the callee's writes. Caller phis are dropped; the caller
 * rebuilds them from the returned exit versions.
 *
 * `max_depth` bounds nesting (1 = direct callees only); a function already on
 * the inlining stack is never expanded again.
 */

use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

use crate::features::flow_graph::domain::BasicBlock;
use crate::features::flow_graph::infrastructure::predecessor_map;
use crate::features::interprocedural::domain::CallType;
use crate::features::ssa::domain::{Instruction, SsaExpr, SsaVar, SsaVersions};
use crate::features::ssa::infrastructure::SsaBuildContext;

static IDENT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("valid identifier regex"));

/// A callee body prepared for splicing
#[derive(Debug, Clone, Default)]
pub struct InlineTemplate {
    pub params: Vec<String>,
    pub body: Vec<Instruction>,
}

impl InlineTemplate {
    /// Flatten first-pass blocks in order, dropping phis and returns
    pub fn from_blocks(params: Vec<String>, blocks: &[BasicBlock]) -> Self {
        let body = blocks
            .iter()
            .flat_map(|b| b.instructions.iter())
            .filter(|i| !matches!(i, Instruction::Phi { .. } | Instruction::Return(_)))
            .cloned()
            .collect();
        Self { params, body }
    }
}

/// What one `inline_blocks` run did
#[derive(Debug, Clone, Default)]
pub struct InlineOutcome {
    pub spliced: usize,
    /// Current versions after each block, in the new numbering
    pub exits: Vec<BTreeMap<String, u32>>,
}

/// Version state of the re-versioning walk
struct Rewalk {
    fresh: SsaBuildContext,
    /// First-pass versions that still denote a name's current value
    live: BTreeMap<String, BTreeSet<u32>>,
    /// First-pass definition -> new version
    renamed: HashMap<(String, u32), u32>,
    written: BTreeSet<String>,
}

impl Rewalk {
    fn is_live(live: &BTreeMap<String, BTreeSet<u32>>, var: &SsaVar) -> bool {
        live.get(&var.name)
            .map_or(var.version == 0, |versions| versions.contains(&var.version))
    }

    /// New version for a first-pass caller read
    fn resolve(&self, var: &SsaVar) -> u32 {
        if Self::is_live(&self.live, var) {
            return self.fresh.current(&var.name);
        }
        self.renamed
            .get(&(var.name.clone(), var.version))
            .copied()
            .unwrap_or(var.version)
    }

    fn define(&mut self, name: &str) -> u32 {
        self.written.insert(name.to_string());
        self.fresh.define(name).version
    }
}

pub struct Inliner<'a> {
    templates: &'a BTreeMap<String, InlineTemplate>,
    max_depth: usize,
}

impl<'a> Inliner<'a> {
    pub fn new(templates: &'a BTreeMap<String, InlineTemplate>, max_depth: usize) -> Self {
        Self {
            templates,
            max_depth,
        }
    }

    /// Inline internal calls of `root` in place.
    ///
    /// When nothing is spliced the blocks and `ctx` are left untouched.
    /// Otherwise `ctx` is replaced by the context of the new numbering.
    pub fn inline_blocks(
        &self,
        root: &str,
        blocks: &mut [BasicBlock],
        ctx: &mut SsaBuildContext,
    ) -> InlineOutcome {
        if self.max_depth == 0 || !self.has_targets(root, blocks) {
            return InlineOutcome::default();
        }

        let preds = predecessor_map(&*blocks);
        let positions: HashMap<String, usize> = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();

        let mut fresh = SsaBuildContext::new();
        fresh.reserve_call_ids(ctx.call_count());
        let mut walk = Rewalk {
            fresh,
            live: BTreeMap::new(),
            renamed: HashMap::new(),
            written: BTreeSet::new(),
        };
        let mut outcome = InlineOutcome::default();
        let mut live_exits: Vec<BTreeMap<String, BTreeSet<u32>>> = Vec::new();
        let mut stack = vec![root.to_string()];

        for index in 0..blocks.len() {
            // if-arms start from their condition block, as in the first pass
            let arm_entry = match (blocks[index].branch_side, preds.get(&blocks[index].id)) {
                (Some(_), Some(p)) if p.len() == 1 => positions
                    .get(&p[0])
                    .and_then(|&cond| Some((live_exits.get(cond)?, outcome.exits.get(cond)?)))
                    .map(|(live, versions)| (live.clone(), versions.clone())),
                _ => None,
            };
            let resume = arm_entry.map(|(live, versions)| {
                (
                    std::mem::replace(&mut walk.live, live),
                    std::mem::replace(&mut walk.fresh.current_version, versions),
                )
            });

            let entry_live = walk.live.clone();
            let entry = walk.fresh.snapshot();
            walk.written.clear();

            let original = std::mem::take(&mut blocks[index].instructions);
            let mut out = Vec::with_capacity(original.len());
            for mut instruction in original {
                if let Instruction::Phi { dest, .. } = &instruction {
                    walk.live
                        .entry(dest.name.clone())
                        .or_insert_with(|| BTreeSet::from([0]))
                        .insert(dest.version);
                    continue;
                }
                instruction.substitute_uses(&mut |v| {
                    Some(SsaExpr::Var(SsaVar::new(v.name.clone(), walk.resolve(v))))
                });
                for_each_def_mut(&mut instruction, &mut |def| {
                    let version = walk.define(&def.name);
                    walk.renamed.insert((def.name.clone(), def.version), version);
                    walk.live.insert(def.name.clone(), BTreeSet::from([def.version]));
                    def.version = version;
                });

                let target = internal_target(&instruction).map(str::to_string);
                out.push(instruction.clone());
                if let Some(callee) = target {
                    outcome.spliced +=
                        self.splice(&callee, &instruction, 1, &mut stack, &mut walk, &mut out);
                }
            }

            let block = &mut blocks[index];
            let mut versions = SsaVersions::default();
            for (name, &version) in &block.ssa_versions.reads {
                let read = SsaVar::new(name.as_str(), version);
                let renumbered = if Rewalk::is_live(&entry_live, &read) {
                    entry.get(name).copied().unwrap_or(0)
                } else {
                    walk.renamed.get(&(name.clone(), version)).copied().unwrap_or(version)
                };
                versions.reads.insert(name.clone(), renumbered);
            }
            for name in &walk.written {
                versions.writes.insert(name.clone(), walk.fresh.current(name));
            }
            block.instructions = out;
            block.ssa_versions = versions;
            outcome.exits.push(walk.fresh.snapshot());
            live_exits.push(walk.live.clone());

            if let Some((previous_live, previous)) = resume {
                for (name, version) in previous {
                    if version > walk.fresh.current(&name) {
                        walk.fresh.set_current(&name, version);
                    }
                }
                for (name, versions) in previous_live {
                    let latest = |set: Option<&BTreeSet<u32>>| {
                        set.and_then(|s| s.iter().max().copied()).unwrap_or(0)
                    };
                    if latest(Some(&versions)) > latest(walk.live.get(&name)) {
                        walk.live.insert(name, versions);
                    }
                }
            }
        }

        *ctx = walk.fresh;
        outcome
    }

    /// Some internal call of `root` has a template to splice
    fn has_targets(&self, root: &str, blocks: &[BasicBlock]) -> bool {
        blocks
            .iter()
            .flat_map(|b| b.instructions.iter())
            .filter_map(internal_target)
            .any(|callee| callee != root && self.templates.contains_key(callee))
    }

    fn splice(
        &self,
        callee: &str,
        call: &Instruction,
        depth: usize,
        stack: &mut Vec<String>,
        walk: &mut Rewalk,
        out: &mut Vec<Instruction>,
    ) -> usize {
        if depth > self.max_depth || stack.iter().any(|f| f == callee) {
            return 0;
        }
        let Some(template) = self.templates.get(callee) else {
            return 0;
        };
        let args = match call {
            Instruction::Call { args, .. } => args.as_slice(),
            _ => &[],
        };
        let bindings: HashMap<&str, &SsaExpr> = template
            .params
            .iter()
            .map(String::as_str)
            .zip(args.iter())
            .collect();
        let renames: HashMap<&str, String> = bindings
            .iter()
            .map(|(param, arg)| (*param, argument_text(arg)))
            .collect();

        trace!(callee, depth, "inlining");
        stack.push(callee.to_string());
        let mut region: HashMap<(String, u32), u32> = HashMap::new();
        let mut spliced = 1;

        for template_instruction in &template.body {
            let mut instruction = template_instruction.clone();
            rename_composites(&mut instruction, &renames);

            instruction.substitute_uses(&mut |v| {
                if v.version == 0 {
                    if let Some(arg) = bindings.get(v.name.as_str()) {
                        return Some((*arg).clone());
                    }
                    return Some(SsaExpr::Var(walk.fresh.use_var(&v.name)));
                }
                let version = region
                    .get(&(v.name.clone(), v.version))
                    .copied()
                    .unwrap_or_else(|| walk.fresh.current(&v.name));
                Some(SsaExpr::Var(SsaVar::new(v.name.clone(), version)))
            });

            for_each_def_mut(&mut instruction, &mut |def| {
                let version = walk.define(&def.name);
                region.insert((def.name.clone(), def.version), version);
                def.version = version;
            });

            let nested = internal_target(&instruction).map(str::to_string);
            out.push(instruction.clone());
            if let Some(nested) = nested {
                spliced += self.splice(&nested, &instruction, depth + 1, stack, walk, out);
            }
        }
        stack.pop();
        spliced
    }
}

/// Function name of an internal call instruction (`super.f` -> `f`)
fn internal_target(instruction: &Instruction) -> Option<&str> {
    match instruction {
        Instruction::Call {
            callee,
            call_type: CallType::Internal,
            ..
        } => callee.rsplit('.').next(),
        _ => None,
    }
}

/// Text an argument contributes to a composite name
fn argument_text(arg: &SsaExpr) -> String {
    match arg {
        SsaExpr::Var(v) => v.name.clone(),
        other => other.to_string(),
    }
}

fn replace_tokens(name: &str, renames: &HashMap<&str, String>) -> String {
    IDENT_TOKEN
        .replace_all(name, |caps: &Captures<'_>| {
            let token = &caps[0];
            renames
                .get(token)
                .cloned()
                .unwrap_or_else(|| token.to_string())
        })
        .into_owned()
}

/// Rewrite parameter tokens inside composite names and call targets;
/// bare parameter names are left for argument binding
fn rename_composites(instruction: &mut Instruction, renames: &HashMap<&str, String>) {
    if renames.is_empty() {
        return;
    }
    let mut rename = |var: &mut SsaVar| {
        if !renames.contains_key(var.name.as_str()) {
            var.name = replace_tokens(&var.name, renames);
        }
    };
    match instruction {
        Instruction::Assign {
            dest,
            implicit_defs,
            prev,
            value,
            ..
        } => {
            rename(dest);
            implicit_defs.iter_mut().for_each(&mut rename);
            if let Some(prev) = prev {
                rename(prev);
            }
            rename_in_expr(value, &mut rename);
        }
        Instruction::Call {
            callee,
            receiver,
            options,
            args,
            ..
        } => {
            *callee = replace_tokens(callee, renames);
            if let Some(receiver) = receiver {
                rename_in_expr(receiver, &mut rename);
            }
            options.iter_mut().for_each(|(_, v)| rename_in_expr(v, &mut rename));
            args.iter_mut().for_each(|a| rename_in_expr(a, &mut rename));
        }
        Instruction::Condition(e) | Instruction::Expression(e) => rename_in_expr(e, &mut rename),
        Instruction::Return(values) | Instruction::Emit { args: values, .. } => {
            values.iter_mut().for_each(|v| rename_in_expr(v, &mut rename))
        }
        Instruction::Phi { .. } | Instruction::Opaque(_) => {}
    }
}

fn rename_in_expr(expr: &mut SsaExpr, rename: &mut dyn FnMut(&mut SsaVar)) {
    expr.substitute(&mut |v| {
        let mut renamed = v.clone();
        rename(&mut renamed);
        (renamed != *v).then(|| SsaExpr::Var(renamed))
    });
}

fn for_each_def_mut(instruction: &mut Instruction, f: &mut dyn FnMut(&mut SsaVar)) {
    match instruction {
        Instruction::Assign {
            dest,
            implicit_defs,
            ..
        } => {
            f(dest);
            implicit_defs.iter_mut().for_each(|d| f(d));
        }
        Instruction::Call { dest, .. } | Instruction::Phi { dest, .. } => f(dest),
        _ => {}
    }
}
