//! Ingestion pipeline: validate, clean, embed, and dual-write chunks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{EmbeddingError, IngestError};
use crate::models::{ChunkData, EmbeddedChunk, IngestReport};
use crate::services::embedding::Embedder;
use crate::services::metadata::MetadataStore;
use crate::services::vector_store::VectorStore;
use crate::utils::text::clean_chunk_text;

/// Drives one batch of chunks through cleaning, embedding, and storage.
///
/// The vector index is the source of truth: a failed index write fails the
/// whole request, while metadata-store writes are best-effort bookkeeping.
pub struct IngestPipeline {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    metadata: Arc<MetadataStore>,
}

impl IngestPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        metadata: Arc<MetadataStore>,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            metadata,
        }
    }

    /// Ingest a batch of chunks. Individually invalid chunks are recorded as
    /// failures without aborting the batch; every input is accounted for
    /// exactly once in the report.
    pub async fn run(&self, chunks: Vec<ChunkData>) -> Result<IngestReport, IngestError> {
        let start = Instant::now();
        let submitted = chunks.len();

        let mut errors: Vec<String> = Vec::new();
        let mut valid: Vec<ChunkData> = Vec::new();

        for mut chunk in chunks {
            if let Err(message) = chunk.validate() {
                errors.push(message);
                continue;
            }

            let cleaned = clean_chunk_text(&chunk.text);
            if cleaned.is_empty() {
                errors.push(format!("empty text after cleaning in chunk {}", chunk.chunk_id));
                continue;
            }

            chunk.text = cleaned;
            valid.push(chunk);
        }

        if valid.is_empty() {
            return Err(IngestError::NoValidChunks(format!(
                "all {submitted} submitted chunks were rejected"
            )));
        }

        info!(total = submitted, valid = valid.len(), "embedding chunk batch");

        let texts: Vec<String> = valid.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_documents(texts).await?;
        if embeddings.len() != valid.len() {
            return Err(IngestError::Embedding(EmbeddingError::CountMismatch {
                expected: valid.len(),
                got: embeddings.len(),
            }));
        }

        let embedded: Vec<EmbeddedChunk> = valid
            .iter()
            .zip(embeddings)
            .map(|(chunk, vector)| EmbeddedChunk {
                chunk_id: chunk.chunk_id.clone(),
                text: chunk.text.clone(),
                vector,
                metadata: chunk.metadata(),
            })
            .collect();

        self.vector_store.upsert_chunks(embedded).await?;

        // The index write succeeded; metadata failures must not fail the run.
        if let Err(e) = self.store_metadata(&valid).await {
            warn!(error = %e, "metadata bookkeeping failed after vector write");
        }

        let report = IngestReport {
            processed_chunks: valid.len(),
            failed_chunks: submitted - valid.len(),
            errors,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            processed = report.processed_chunks,
            failed = report.failed_chunks,
            elapsed_ms = report.elapsed_ms,
            "ingestion complete"
        );
        Ok(report)
    }

    async fn store_metadata(&self, chunks: &[ChunkData]) -> Result<(), crate::error::MetadataError> {
        // One document record per distinct source id; total_chunks counts
        // this batch only, and re-ingestion overwrites the previous record.
        let mut groups: HashMap<&str, Vec<&ChunkData>> = HashMap::new();
        for chunk in chunks {
            groups.entry(&chunk.source_doc_id).or_default().push(chunk);
        }

        for (doc_id, members) in groups {
            let first = members[0];
            let title = format!("{} ({})", first.journal_name, first.year);
            self.metadata
                .upsert_document(doc_id, &title, &first.journal_name, first.year, members.len() as i64)
                .await?;
        }

        self.metadata.upsert_chunks(chunks).await?;
        Ok(())
    }
}
