//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, init::InitArgs, library::LibCommands, org::OrgCommands,
};
use crate::core::store::Backend;

#[derive(Parser)]
#[command(name = "trove")]
#[command(author, version, about = "Record keeping for a research organization and its library")]
#[command(long_about = "Keeps employees, departments, projects and equipment of a research organization, \
plus the members, catalog and loans of its library, in plain text files or an embedded SQLite database.")]
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

    /// Data directory (default: .trove/data of the enclosing workspace)
    #[arg(long, global = true, env = "TROVE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Persistence backend (default: from config, else file)
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new trove workspace
    Init(InitArgs),

    /// Organization records: departments, employees, projects, equipment
    #[command(subcommand)]
    Org(OrgCommands),

    /// Library records: users, media, loans
    #[command(subcommand)]
    Lib(LibCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (tsv for lists, text for single records)
    #[default]
    Auto,
    /// Tab-aligned columns (for terminals and piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
