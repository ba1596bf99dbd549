//! Vector index abstraction.
//!
//! The index is an external collaborator: the trait captures exactly the
//! operations the pipelines need from it. Similarity scores are clamped to
//! [0, 1] at this boundary, whatever the backend's metric reports.

mod qdrant;

pub use qdrant::QdrantIndex;

use async_trait::async_trait;

use crate::error::VectorStoreError;
use crate::models::{EmbeddedChunk, ScoredChunk};

/// Exact-match conjunction over named metadata fields.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub journal_name: Option<String>,
    pub year: Option<i32>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.journal_name.is_none() && self.year.is_none()
    }
}

/// Operations the core requires from a vector index.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check that the index is reachable.
    async fn health_check(&self) -> Result<bool, VectorStoreError>;

    /// Create the collection if it does not exist.
    async fn create_collection(&self) -> Result<(), VectorStoreError>;

    /// Insert or overwrite chunks by chunk id, with text, vector, and
    /// metadata written as one atomic unit per chunk.
    async fn upsert_chunks(&self, chunks: Vec<EmbeddedChunk>) -> Result<(), VectorStoreError>;

    /// Nearest-neighbor search under an exact-match filter, ordered by
    /// descending similarity. An empty result is normal, not an error.
    async fn search(
        &self,
        query_vector: Vec<f32>,
        k: u64,
        filter: &SearchFilter,
    ) -> Result<Vec<ScoredChunk>, VectorStoreError>;

    /// All chunks for one source document, sorted ascending by chunk index.
    /// Scores are fixed at 1.0 for this exact-match path.
    async fn chunks_by_source(
        &self,
        source_doc_id: &str,
    ) -> Result<Vec<ScoredChunk>, VectorStoreError>;
}
