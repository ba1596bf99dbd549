use anyhow::{Context, Result};
use clap::Args;

use super::connect;
use crate::cli::output::get_formatter;
use crate::error::JournalError;
use crate::models::{Config, OutputFormat};
use crate::services::JournalService;

#[derive(Debug, Args)]
pub struct JournalArgs {
    #[arg(required = true, help = "Journal document identifier")]
    pub journal_id: String,

    #[arg(long, help = "Show aggregated statistics only (does not count as an access)")]
    pub stats: bool,
}

pub async fn handle_journal(args: JournalArgs, format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let collaborators = connect(&config)?;
    let service = JournalService::new(collaborators.vector_store, collaborators.metadata);

    let result = if args.stats {
        service
            .journal_stats(&args.journal_id)
            .await
            .map(|stats| formatter.format_journal_stats(&stats))
    } else {
        service
            .get_journal(&args.journal_id)
            .await
            .map(|journal| formatter.format_journal(&journal))
    };

    match result {
        Ok(rendered) => {
            print!("{}", rendered);
            Ok(())
        }
        Err(JournalError::NotFound(id)) => {
            anyhow::bail!("journal '{}' not found", id);
        }
        Err(e) => Err(e).context("journal lookup failed"),
    }
}
