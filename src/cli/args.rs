//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    audit::AuditArgs, completions::CompletionsArgs, import::ImportArgs, init::InitArgs,
    status::StatusArgs,
};

#[derive(Parser)]
#[command(name = "hdp")]
#[command(author, version, about = "Houston Development Data Pipeline")]
#[command(long_about = "Import Houston real-estate CSV exports into a relational store and audit the quality of the result.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .hdp/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new hdp workspace
    Init(InitArgs),

    /// Import CSV exports into the database
    Import(ImportArgs),

    /// Audit data quality and write the Markdown and JSON reports
    Audit(AuditArgs),

    /// Show row counts for every table
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
