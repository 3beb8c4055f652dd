//! Text and JSON reports
//!
//! The text lines are consumed downstream and must stay stable:
//!
//! ```text
//! Contract: Bank
//! Entrypoint: withdraw at line 12, col 5
//! No internal calls
//! External calls: msg.sender.call
//! !!!! REENTRANCY found in Bank.withdraw
//! Description: ...
//! Severity: High
//! ```

use std::fmt::Write;

use crate::errors::Result;
use crate::pipeline::{ArtifactAnalysis, ContractAnalysis};

fn calls_line(label: &str, names: &[String]) -> String {
    if names.is_empty() {
        format!("No {} calls", label.to_lowercase())
    } else {
        format!("{} calls: {}", label, names.join(", "))
    }
}

/// Report for one contract; `source` resolves entrypoint line/column
pub fn render_contract(analysis: &ContractAnalysis, source: &str) -> String {
    let summary = &analysis.summary;
    let mut out = String::new();
    let _ = writeln!(out, "Contract: {}", summary.name);

    for function in &summary.entrypoints {
        let (line, col) = function.location.line_col(source);
        let _ = writeln!(out, "Entrypoint: {} at line {}, col {}", function.name, line, col);
        let _ = writeln!(out, "{}", calls_line("Internal", &function.internal_calls()));
        let _ = writeln!(out, "{}", calls_line("External", &function.external_calls()));

        for finding in analysis.findings.iter().filter(|f| f.function == function.name) {
            let _ = writeln!(out, "!!!! REENTRANCY found in {}", finding.qualified_name());
            let _ = writeln!(out, "Description: {}", finding.description);
            let _ = writeln!(out, "Severity: {}", finding.severity);
        }
    }
    out
}

pub fn render_artifact(artifact: &ArtifactAnalysis) -> String {
    let source = artifact.source.as_deref().unwrap_or("");
    artifact
        .contracts
        .iter()
        .map(|c| render_contract(c, source))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(artifacts: &[ArtifactAnalysis]) -> Result<String> {
    Ok(serde_json::to_string_pretty(artifacts)?)
}
