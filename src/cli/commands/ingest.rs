use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::connect;
use crate::cli::output::get_formatter;
use crate::models::{ChunkData, Config, OutputFormat};
use crate::services::IngestPipeline;

#[derive(Debug, Args)]
pub struct IngestArgs {
    #[arg(required = true, help = "JSON file containing an array of chunk records")]
    pub file: PathBuf,
}

pub async fn handle_ingest(args: IngestArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let chunks: Vec<ChunkData> =
        serde_json::from_str(&content).context("failed to parse chunk records")?;

    if chunks.is_empty() {
        anyhow::bail!("no chunks found in {}", args.file.display());
    }

    if verbose {
        eprintln!("Ingesting {} chunks from {}", chunks.len(), args.file.display());
    }

    let collaborators = connect(&config)?;
    collaborators
        .vector_store
        .create_collection()
        .await
        .context("failed to prepare vector index collection")?;

    let spinner = if format == OutputFormat::Text {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner());
        bar.set_message(format!("Embedding {} chunks...", chunks.len()));
        Some(bar)
    } else {
        None
    };

    let pipeline = IngestPipeline::new(
        collaborators.embedder,
        collaborators.vector_store,
        collaborators.metadata,
    );
    let report = pipeline.run(chunks).await.context("ingestion failed")?;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    print!("{}", formatter.format_ingest_report(&report));
    Ok(())
}
