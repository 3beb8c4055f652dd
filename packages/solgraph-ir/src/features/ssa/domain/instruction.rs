/*
 * Structured SSA instructions
 *
 * Passes communicate through these types; text only appears through the
 * Display impls at the reporting boundary:
 *   x_1 = a_0 + 1
 *   x_2 = x_1 + amount_0          (compound assignment)
 *   ret1_1 = call[external](token.transfer, to_0, amount_0)
 *   x_3 = phi(x_1, x_2)
 */

use std::fmt;

use serde::{Serialize, Serializer};

use crate::features::interprocedural::domain::CallType;
use crate::shared::models::SourceLocation;

/// Versioned variable, version 0 = value on function entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SsaVar {
    pub name: String,
    pub version: u32,
}

impl SsaVar {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for SsaVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.version)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SsaExpr {
    Var(SsaVar),
    Literal(String),
    Binary {
        op: String,
        lhs: Box<SsaExpr>,
        rhs: Box<SsaExpr>,
    },
    Unary {
        op: String,
        operand: Box<SsaExpr>,
    },
    /// Type conversion or struct constructor: `address(x_0)`, `Point(a_0, b_0)`
    TypeApply {
        name: String,
        args: Vec<SsaExpr>,
    },
    Tuple(Vec<SsaExpr>),
    Ternary {
        cond: Box<SsaExpr>,
        then: Box<SsaExpr>,
        otherwise: Box<SsaExpr>,
    },
    /// Anything not modeled, kept as source text
    Opaque(String),
}

impl SsaExpr {
    pub fn var(name: impl Into<String>, version: u32) -> Self {
        SsaExpr::Var(SsaVar::new(name, version))
    }

    pub fn for_each_var<'a>(&'a self, f: &mut dyn FnMut(&'a SsaVar)) {
        match self {
            SsaExpr::Var(v) => f(v),
            SsaExpr::Literal(_) | SsaExpr::Opaque(_) => {}
            SsaExpr::Binary { lhs, rhs, .. } => {
                lhs.for_each_var(f);
                rhs.for_each_var(f);
            }
            SsaExpr::Unary { operand, .. } => operand.for_each_var(f),
            SsaExpr::TypeApply { args, .. } | SsaExpr::Tuple(args) => {
                args.iter().for_each(|a| a.for_each_var(f))
            }
            SsaExpr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                cond.for_each_var(f);
                then.for_each_var(f);
                otherwise.for_each_var(f);
            }
        }
    }

    /// Replace variables in place; `f` returns the replacement expression or
    /// `None` to keep the variable. Replacements are not revisited.
    pub fn substitute(&mut self, f: &mut dyn FnMut(&SsaVar) -> Option<SsaExpr>) {
        match self {
            SsaExpr::Var(v) => {
                if let Some(replacement) = f(v) {
                    *self = replacement;
                }
            }
            SsaExpr::Literal(_) | SsaExpr::Opaque(_) => {}
            SsaExpr::Binary { lhs, rhs, .. } => {
                lhs.substitute(f);
                rhs.substitute(f);
            }
            SsaExpr::Unary { operand, .. } => operand.substitute(f),
            SsaExpr::TypeApply { args, .. } | SsaExpr::Tuple(args) => {
                args.iter_mut().for_each(|a| a.substitute(f))
            }
            SsaExpr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                cond.substitute(f);
                then.substitute(f);
                otherwise.substitute(f);
            }
        }
    }

    pub fn vars(&self) -> Vec<&SsaVar> {
        let mut out = Vec::new();
        self.for_each_var(&mut |v| out.push(v));
        out
    }

    fn needs_parens(&self) -> bool {
        matches!(self, SsaExpr::Binary { .. } | SsaExpr::Ternary { .. })
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &SsaExpr) -> fmt::Result {
    if expr.needs_parens() {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[SsaExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for SsaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SsaExpr::Var(v) => write!(f, "{v}"),
            SsaExpr::Literal(text) | SsaExpr::Opaque(text) => f.write_str(text),
            SsaExpr::Binary { op, lhs, rhs } => {
                write_operand(f, lhs)?;
                write!(f, " {op} ")?;
                write_operand(f, rhs)
            }
            SsaExpr::Unary { op, operand } => {
                f.write_str(op)?;
                write_operand(f, operand)
            }
            SsaExpr::TypeApply { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            SsaExpr::Tuple(items) => {
                f.write_str("(")?;
                write_list(f, items)?;
                f.write_str(")")
            }
            SsaExpr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                write_operand(f, cond)?;
                f.write_str(" ? ")?;
                write_operand(f, then)?;
                f.write_str(" : ")?;
                write_operand(f, otherwise)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `dest = value`, or `dest = prev op value` for `op=` assignments
    Assign {
        dest: SsaVar,
        /// Prefixes of a composite destination (`m` for `m[k]`)
        implicit_defs: Vec<SsaVar>,
        prev: Option<SsaVar>,
        op: Option<String>,
        value: SsaExpr,
    },
    Call {
        dest: SsaVar,
        callee: String,
        call_type: CallType,
        receiver: Option<SsaExpr>,
        options: Vec<(String, SsaExpr)>,
        args: Vec<SsaExpr>,
        location: SourceLocation,
    },
    Condition(SsaExpr),
    Return(Vec<SsaExpr>),
    Emit {
        event: String,
        args: Vec<SsaExpr>,
    },
    Phi {
        dest: SsaVar,
        /// (predecessor block id, reaching version)
        sources: Vec<(String, SsaVar)>,
    },
    Expression(SsaExpr),
    Opaque(String),
}

impl Instruction {
    /// Variables defined here
    pub fn defs(&self) -> Vec<&SsaVar> {
        match self {
            Instruction::Assign {
                dest,
                implicit_defs,
                ..
            } => std::iter::once(dest).chain(implicit_defs.iter()).collect(),
            Instruction::Call { dest, .. } | Instruction::Phi { dest, .. } => vec![dest],
            _ => Vec::new(),
        }
    }

    /// Variables read here, in operand order
    pub fn uses(&self) -> Vec<&SsaVar> {
        let mut out = Vec::new();
        self.for_each_use(&mut |v| out.push(v));
        out
    }

    pub fn for_each_use<'a>(&'a self, f: &mut dyn FnMut(&'a SsaVar)) {
        match self {
            Instruction::Assign { prev, value, .. } => {
                if let Some(prev) = prev {
                    f(prev);
                }
                value.for_each_var(f);
            }
            Instruction::Call {
                receiver,
                options,
                args,
                ..
            } => {
                if let Some(receiver) = receiver {
                    receiver.for_each_var(f);
                }
                options.iter().for_each(|(_, v)| v.for_each_var(f));
                args.iter().for_each(|a| a.for_each_var(f));
            }
            Instruction::Condition(e) | Instruction::Expression(e) => e.for_each_var(f),
            Instruction::Return(values) | Instruction::Emit { args: values, .. } => {
                values.iter().for_each(|v| v.for_each_var(f))
            }
            Instruction::Phi { sources, .. } => sources.iter().for_each(|(_, v)| f(v)),
            Instruction::Opaque(_) => {}
        }
    }

    /// Rewrite every read operand; phi sources stay untouched
    pub fn substitute_uses(&mut self, f: &mut dyn FnMut(&SsaVar) -> Option<SsaExpr>) {
        match self {
            Instruction::Assign { prev, value, .. } => {
                if let Some(p) = prev {
                    if let Some(SsaExpr::Var(replacement)) = f(p) {
                        *p = replacement;
                    }
                }
                value.substitute(f);
            }
            Instruction::Call {
                receiver,
                options,
                args,
                ..
            } => {
                if let Some(receiver) = receiver {
                    receiver.substitute(f);
                }
                options.iter_mut().for_each(|(_, v)| v.substitute(f));
                args.iter_mut().for_each(|a| a.substitute(f));
            }
            Instruction::Condition(e) | Instruction::Expression(e) => e.substitute(f),
            Instruction::Return(values) | Instruction::Emit { args: values, .. } => {
                values.iter_mut().for_each(|v| v.substitute(f))
            }
            Instruction::Phi { .. } | Instruction::Opaque(_) => {}
        }
    }

    /// Ends its block unless it is the last instruction
    pub fn is_effectful(&self) -> bool {
        matches!(
            self,
            Instruction::Call { .. }
                | Instruction::Assign { .. }
                | Instruction::Emit { .. }
                | Instruction::Return(_)
        )
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, Instruction::Phi { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign {
                dest,
                prev,
                op,
                value,
                ..
            } => match (prev, op) {
                (Some(prev), Some(op)) => {
                    write!(f, "{dest} = {prev} {op} ")?;
                    write_operand(f, value)
                }
                _ => write!(f, "{dest} = {value}"),
            },
            Instruction::Call {
                dest,
                callee,
                call_type,
                options,
                args,
                ..
            } => {
                write!(f, "{dest} = call[{call_type}]({callee}")?;
                for (name, value) in options {
                    write!(f, ", {name}={value}")?;
                }
                for arg in args {
                    write!(f, ", {arg}")?;
                }
                f.write_str(")")
            }
            Instruction::Condition(cond) => write!(f, "if ({cond})"),
            Instruction::Return(values) => {
                if values.is_empty() {
                    f.write_str("return")
                } else {
                    f.write_str("return ")?;
                    write_list(f, values)
                }
            }
            Instruction::Emit { event, args } => {
                write!(f, "emit {event}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Instruction::Phi { dest, sources } => {
                write!(f, "{dest} = phi(")?;
                for (i, (_, var)) in sources.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{var}")?;
                }
                f.write_str(")")
            }
            Instruction::Expression(expr) => write!(f, "{expr}"),
            Instruction::Opaque(text) => f.write_str(text),
        }
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
