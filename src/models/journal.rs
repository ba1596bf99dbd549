//! Document and journal-lookup records backed by the metadata store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::search::SearchResult;

/// The owning aggregate of chunks sharing a source document id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub journal_name: String,
    pub year: i32,
    /// Chunk count committed during the last ingestion batch for this id
    pub total_chunks: i64,
    pub access_count: i64,
    pub created_at: Option<String>,
    pub last_accessed: Option<String>,
}

/// Per-chunk bookkeeping row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk_id: String,
    pub source_doc_id: String,
    pub chunk_index: u32,
    pub section: Option<String>,
    pub subsection: Option<String>,
    pub page_number: Option<i32>,
    pub usage_count: i64,
    pub last_accessed: Option<String>,
}

/// Aggregated statistics for one journal document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalStats {
    pub total_chunks: usize,
    /// Chunk count per section name
    pub sections: BTreeMap<String, usize>,
    pub most_popular_section: Option<String>,
    pub total_views: i64,
    pub last_accessed: Option<String>,
    pub average_chunk_length: f64,
}

/// Full journal lookup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalView {
    pub journal_id: String,
    pub title: String,
    pub journal_name: String,
    pub year: i32,
    pub chunks: Vec<SearchResult>,
    pub stats: JournalStats,
    /// Other document ids published in the same journal
    pub related_documents: Vec<String>,
}
