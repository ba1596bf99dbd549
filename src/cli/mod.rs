//! CLI surface for the journal RAG pipelines.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Retrieval-augmented search over scientific-journal text chunks.
#[derive(Debug, Parser)]
#[command(name = "jrag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'f', global = true, help = "Output format: text or json")]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest journal chunks from a JSON file
    Ingest(commands::IngestArgs),

    /// Search ingested chunks, optionally synthesizing a cited answer
    Search(commands::SearchArgs),

    /// Show everything known about one journal document
    Journal(commands::JournalArgs),

    /// Check infrastructure status (vector index, metadata store)
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
