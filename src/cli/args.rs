//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    coating::CoatingCommands, completions::CompletionsArgs, init::InitArgs, insp::InspCommands,
    plan::PlanArgs, table::TableCommands,
};

#[derive(Parser)]
#[command(name = "aql")]
#[command(author, version, about = "Acceptance sampling for incoming inspection")]
#[command(long_about = "Resolve ISO 2859-1 sample plans, record dimensional measurements and \
coating readings, and drive the multi-step accept/reject decision for a batch.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .aql/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new AQL project
    Init(InitArgs),

    /// Show the sample plan for a batch quantity
    Plan(PlanArgs),

    /// Inspect or validate the Ac/Re table
    #[command(subcommand)]
    Table(TableCommands),

    /// Batch inspection management
    #[command(subcommand)]
    Insp(InspCommands),

    /// Coating thickness statistics and checks
    #[command(subcommand)]
    Coating(CoatingCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (pretty for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `auto` against the configured default, then the command's own default
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}
