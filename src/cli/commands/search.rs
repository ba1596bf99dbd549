use anyhow::{Context, Result};
use clap::Args;

use super::connect;
use crate::cli::output::get_formatter;
use crate::models::{Config, GenerationConfig, OutputFormat, SearchRequest};
use crate::services::{AnswerSynthesizer, GenerationClient, QueryPipeline};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(required = true, help = "Search query text")]
    pub query: String,

    #[arg(long, short = 'k', help = "Number of results to return")]
    pub k: Option<u32>,

    #[arg(long, help = "Minimum similarity score threshold (0.0-1.0)")]
    pub min_score: Option<f32>,

    #[arg(long, short = 'j', help = "Filter by journal name")]
    pub journal: Option<String>,

    #[arg(long, short = 'y', help = "Filter by publication year")]
    pub year: Option<i32>,

    #[arg(long, short = 'a', help = "Synthesize a cited answer from the results")]
    pub answer: bool,
}

pub async fn handle_search(args: SearchArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let k = args.k.unwrap_or(config.search.default_k);
    let min_score = args.min_score.unwrap_or(config.search.min_score);
    if !(0.0..=1.0).contains(&min_score) {
        anyhow::bail!("min_score must be between 0.0 and 1.0");
    }

    if verbose {
        eprintln!("Query: \"{}\"", args.query.trim());
        eprintln!("  k: {k}, min_score: {min_score:.2}");
        if let Some(ref journal) = args.journal {
            eprintln!("  Journal: {journal}");
        }
        if let Some(year) = args.year {
            eprintln!("  Year: {year}");
        }
    }

    let mut request = SearchRequest::new(args.query)
        .with_k(k)
        .with_min_score(min_score)
        .with_answer(args.answer);
    if let Some(journal) = args.journal {
        request = request.with_journal_filter(journal);
    }
    if let Some(year) = args.year {
        request = request.with_year_filter(year);
    }

    let collaborators = connect(&config)?;
    let synthesizer = AnswerSynthesizer::new(Arc::new(build_generator(&config.generation)?));
    let pipeline = QueryPipeline::new(
        collaborators.embedder,
        collaborators.vector_store,
        collaborators.metadata,
        synthesizer,
        config.search.clone(),
    );

    let response = pipeline.run(request).await.context("search failed")?;
    print!("{}", formatter.format_search_response(&response));
    Ok(())
}

fn build_generator(config: &GenerationConfig) -> Result<GenerationClient> {
    GenerationClient::new(config).context("failed to create generation client")
}
