//! Chunk records submitted for ingestion and their structured metadata.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Earliest publication year accepted for a chunk.
pub const MIN_PUBLICATION_YEAR: i32 = 1900;

/// A unit of source text submitted by the caller.
///
/// Chunk ids are caller-assigned and globally unique; re-submitting an id
/// overwrites the stored chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkData {
    pub chunk_id: String,
    pub text: String,
    pub chunk_index: u32,
    pub source_doc_id: String,
    pub journal_name: String,
    pub year: i32,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub subsection: Option<String>,
    #[serde(default)]
    pub page_number: Option<i32>,
}

impl ChunkData {
    /// Validate caller-supplied fields before any external call.
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err(format!("empty text in chunk {}", self.chunk_id));
        }
        let max_year = Utc::now().year() + 1;
        if self.year < MIN_PUBLICATION_YEAR || self.year > max_year {
            return Err(format!(
                "year {} out of range [{MIN_PUBLICATION_YEAR}, {max_year}] in chunk {}",
                self.year, self.chunk_id
            ));
        }
        Ok(())
    }

    /// Structured metadata for the vector index payload.
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            source_doc_id: self.source_doc_id.clone(),
            journal_name: self.journal_name.clone(),
            year: self.year,
            section: self.section.clone(),
            subsection: self.subsection.clone(),
            page_number: self.page_number,
            chunk_index: self.chunk_index,
            usage_count: 0,
        }
    }
}

/// Fixed-field chunk metadata carried between the stores and the pipelines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source_doc_id: String,
    pub journal_name: String,
    pub year: i32,
    pub section: Option<String>,
    pub subsection: Option<String>,
    pub page_number: Option<i32>,
    pub chunk_index: u32,
    pub usage_count: i64,
}

/// A chunk paired with its embedding, ready for the vector index.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk_id: String,
    pub text: String,
    pub vector: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// A chunk retrieved from the vector index with a similarity score.
///
/// Scores are clamped to [0, 1] at the store boundary; a score of 1.0 marks
/// exact-match retrieval paths where similarity does not apply.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub text: String,
    pub score: f32,
    pub metadata: ChunkMetadata,
}
