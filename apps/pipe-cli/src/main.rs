//! # pipe-cli
//!
//! Operator command line for the PIPE guardrail engine.
//!
//! - `pipe validate <FILES>...` — check resource definitions
//! - `pipe guardrails` — list the guardrails an engine would run, in order
//! - `pipe check --phase pre|post` — evaluate one step and print the outcomes

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pipe_guardrails::GuardrailSettings;
use pipe_observability::init_logging;

/// PIPE operator CLI — validate definitions and exercise guardrails.
#[derive(Parser)]
#[command(name = "pipe", version, about)]
struct Cli {
    /// Settings file with guardrail limits and logging options.
    #[arg(long, global = true, default_value = "pipe.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate resource definition files.
    Validate {
        /// YAML files, each holding one or more resources.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List guardrails in dispatch order.
    Guardrails {
        /// Guardrail resource definitions to use instead of the default set.
        #[arg(long)]
        definitions: Option<PathBuf>,
    },
    /// Run one guardrail evaluation.
    Check(commands::check::CheckArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = GuardrailSettings::load_or_default(&cli.config)?;
    init_logging(&settings.logging)?;

    match &cli.command {
        Commands::Validate { files } => commands::validate::execute(files),
        Commands::Guardrails { definitions } => {
            commands::guardrails::execute(&settings, definitions.as_deref())
        }
        Commands::Check(args) => commands::check::execute(args, &settings),
    }
}
