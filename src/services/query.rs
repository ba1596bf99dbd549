//! Query pipeline: embed, search, threshold, track usage, synthesize.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::SearchError;
use crate::models::{SearchConfig, SearchRequest, SearchResponse, SearchResult};
use crate::services::embedding::Embedder;
use crate::services::metadata::MetadataStore;
use crate::services::synthesizer::AnswerSynthesizer;
use crate::services::vector_store::{SearchFilter, VectorStore};

/// Executes similarity searches and optional answer synthesis.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    metadata: Arc<MetadataStore>,
    synthesizer: AnswerSynthesizer,
    limits: SearchConfig,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        metadata: Arc<MetadataStore>,
        synthesizer: AnswerSynthesizer,
        limits: SearchConfig,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            metadata,
            synthesizer,
            limits,
        }
    }

    /// Run one search request end to end.
    ///
    /// Results keep the index's descending-similarity order; the score
    /// threshold only removes, never reorders. Usage tracking, synthesis,
    /// and search logging are best-effort and never fail the query.
    pub async fn run(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let start = Instant::now();

        let query = request.query.trim().to_string();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery("query cannot be empty".to_string()));
        }
        if request.k < 1 || request.k > self.limits.max_k {
            return Err(SearchError::InvalidQuery(format!(
                "k must be between 1 and {}",
                self.limits.max_k
            )));
        }

        let query_vector = self.embedder.embed_query(&query).await?;

        let filter = SearchFilter {
            journal_name: request.journal_filter.clone(),
            year: request.year_filter,
        };
        let hits = self
            .vector_store
            .search(query_vector, u64::from(request.k), &filter)
            .await?;

        // Post-filter: the index ranks by distance but has no score floor.
        let results: Vec<SearchResult> = hits
            .into_iter()
            .filter(|hit| hit.score >= request.min_score)
            .map(SearchResult::from)
            .collect();

        let chunk_ids: Vec<String> = results.iter().map(|r| r.chunk_id.clone()).collect();
        if !chunk_ids.is_empty() {
            if let Err(e) = self.metadata.increment_chunk_usage(&chunk_ids).await {
                warn!(error = %e, "usage tracking failed");
            }
        }

        let generated_answer = if request.generate_answer && !results.is_empty() {
            match self.synthesizer.synthesize(&query, &results).await {
                Ok(answer) => Some(answer),
                Err(e) => {
                    warn!(error = %e, "answer synthesis failed, returning results without answer");
                    None
                }
            }
        } else {
            None
        };

        let search_time_ms = start.elapsed().as_millis() as u64;
        if let Err(e) = self.metadata.log_search(&query, results.len(), search_time_ms).await {
            warn!(error = %e, "search logging failed");
        }

        info!(
            results = results.len(),
            elapsed_ms = search_time_ms,
            answered = generated_answer.is_some(),
            "search complete"
        );

        Ok(SearchResponse {
            total_results: results.len(),
            results,
            query,
            search_time_ms,
            generated_answer,
        })
    }
}
