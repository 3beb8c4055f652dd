//! Solgraph CLI
//!
//! # Usage
//!
//! ```bash
//! # Build a Foundry project and analyze every contract under src/
//! solgraph analyze path/to/project
//!
//! # Reuse existing artifacts, stricter preset, JSON output
//! solgraph analyze path/to/project --skip-build --preset thorough --json
//!
//! # Single artifact
//! solgraph ast out/Bank.sol/Bank.json --source src/Bank.sol
//! ```
//!
//! Exit code: 0 clean, 1 reentrancy reported, 2 error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use solgraph_ir::config::{AnalysisConfig, Preset};
use solgraph_ir::features::parsing::infrastructure::ForgeBuildTool;
use solgraph_ir::report::{render_artifact, render_json};
use solgraph_ir::{analyze_artifact, analyze_project, ArtifactAnalysis};

#[derive(Parser)]
#[command(name = "solgraph")]
#[command(about = "Solidity CFG/SSA reentrancy analyzer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: CommonOptions,
}

#[derive(Args)]
struct CommonOptions {
    /// Analysis preset (fast, balanced, thorough)
    #[arg(long, global = true)]
    preset: Option<String>,

    /// YAML configuration file (overrides --preset)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of the text report
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and analyze a Foundry project
    Analyze {
        /// Project root (contains src/ and out/)
        project: PathBuf,

        /// Use existing artifacts under out/
        #[arg(long)]
        skip_build: bool,

        /// Build tool executable
        #[arg(long, default_value = "forge")]
        forge: String,
    },

    /// Analyze a single AST artifact
    Ast {
        /// Artifact JSON (`{"ast": ...}` or a bare SourceUnit)
        artifact: PathBuf,

        /// Matching source file, for line/column output
        #[arg(long)]
        source: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_config(options: &CommonOptions) -> solgraph_ir::Result<AnalysisConfig> {
    if let Some(path) = &options.config {
        return Ok(AnalysisConfig::from_yaml(path)?);
    }
    let preset = match &options.preset {
        Some(name) => Preset::from_str(name)?,
        None => Preset::default(),
    };
    Ok(AnalysisConfig::preset(preset))
}

fn read_source(path: Option<&Path>) -> solgraph_ir::Result<Option<String>> {
    path.map(std::fs::read_to_string).transpose().map_err(Into::into)
}

fn run(cli: Cli) -> solgraph_ir::Result<Vec<ArtifactAnalysis>> {
    let config = load_config(&cli.options)?;
    tracing::debug!(config = %config.describe(), "configuration");

    match cli.command {
        Commands::Analyze {
            project,
            skip_build,
            forge,
        } => {
            let tool = ForgeBuildTool::with_program(forge);
            let artifacts = analyze_project(&tool, &project, skip_build, &config);
            if artifacts.is_empty() && !cli.options.json {
                println!("no src files found");
            }
            Ok(artifacts)
        }
        Commands::Ast { artifact, source } => {
            let source = read_source(source.as_deref())?;
            Ok(vec![analyze_artifact(&artifact, source, &config)?])
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.options.verbose);
    let json = cli.options.json;

    let artifacts = match run(cli) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    if json {
        match render_json(&artifacts) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        for artifact in &artifacts {
            print!("{}", render_artifact(artifact));
        }
    }

    let findings: usize = artifacts.iter().map(|a| a.finding_count()).sum();
    if findings > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
