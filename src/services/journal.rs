//! Journal document lookup: chunks, usage stats, related documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::error::JournalError;
use crate::models::{ChunkRecord, DocumentRecord, JournalStats, JournalView, SearchResult};
use crate::services::metadata::MetadataStore;
use crate::services::vector_store::VectorStore;

/// Read-side service over one ingested journal document.
pub struct JournalService {
    vector_store: Arc<dyn VectorStore>,
    metadata: Arc<MetadataStore>,
}

impl JournalService {
    pub fn new(vector_store: Arc<dyn VectorStore>, metadata: Arc<MetadataStore>) -> Self {
        Self {
            vector_store,
            metadata,
        }
    }

    /// Retrieve everything known about a journal document.
    ///
    /// Unknown ids are a not-found condition and leave all access counters
    /// untouched; the access touch happens only after a successful lookup.
    pub async fn get_journal(&self, journal_id: &str) -> Result<JournalView, JournalError> {
        let view = self.build_view(journal_id).await?;

        if let Err(e) = self.metadata.touch_document_access(journal_id).await {
            warn!(error = %e, "access tracking failed");
        }

        Ok(view)
    }

    /// Aggregated statistics only; does not count as an access.
    pub async fn journal_stats(&self, journal_id: &str) -> Result<JournalStats, JournalError> {
        Ok(self.build_view(journal_id).await?.stats)
    }

    async fn build_view(&self, journal_id: &str) -> Result<JournalView, JournalError> {
        let document: DocumentRecord = self
            .metadata
            .get_document(journal_id)
            .await?
            .ok_or_else(|| JournalError::NotFound(journal_id.to_string()))?;

        let chunks = self.vector_store.chunks_by_source(journal_id).await?;
        if chunks.is_empty() {
            return Err(JournalError::NotFound(journal_id.to_string()));
        }

        let usage: BTreeMap<String, ChunkRecord> = self
            .metadata
            .chunks_for_document(journal_id)
            .await?
            .into_iter()
            .map(|record| (record.chunk_id.clone(), record))
            .collect();

        let mut sections: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_views: i64 = 0;
        let mut total_text_length: usize = 0;
        let mut results: Vec<SearchResult> = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let section = chunk
                .metadata
                .section
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            *sections.entry(section).or_insert(0) += 1;

            let usage_count = usage
                .get(&chunk.chunk_id)
                .map(|record| record.usage_count)
                .unwrap_or(0);
            total_views += usage_count;
            total_text_length += chunk.text.len();

            let mut result = SearchResult::from(chunk);
            result.usage_count = usage_count;
            results.push(result);
        }

        let most_popular_section = sections
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(name, _)| name.clone());
        let average_chunk_length = total_text_length as f64 / results.len() as f64;

        let related_documents = self
            .metadata
            .related_documents(&document.journal_name, journal_id)
            .await?;

        Ok(JournalView {
            journal_id: journal_id.to_string(),
            title: document.title,
            journal_name: document.journal_name,
            year: document.year,
            stats: JournalStats {
                total_chunks: results.len(),
                sections,
                most_popular_section,
                total_views,
                last_accessed: document.last_accessed,
                average_chunk_length,
            },
            chunks: results,
            related_documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkData, ChunkMetadata, EmbeddedChunk};
    use crate::services::test_support::MockVectorIndex;

    fn chunk(id: &str, doc: &str, index: u32, section: Option<&str>, text: &str) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk_id: id.to_string(),
            text: text.to_string(),
            vector: vec![0.0; 3],
            metadata: ChunkMetadata {
                source_doc_id: doc.to_string(),
                journal_name: "Nature".to_string(),
                year: 2020,
                section: section.map(str::to_string),
                chunk_index: index,
                ..Default::default()
            },
        }
    }

    fn record(id: &str, doc: &str, index: u32) -> ChunkData {
        ChunkData {
            chunk_id: id.to_string(),
            text: "t".to_string(),
            chunk_index: index,
            source_doc_id: doc.to_string(),
            journal_name: "Nature".to_string(),
            year: 2020,
            section: None,
            subsection: None,
            page_number: None,
        }
    }

    async fn fixture() -> (JournalService, Arc<MockVectorIndex>, Arc<MetadataStore>) {
        let index = Arc::new(MockVectorIndex::default());
        let metadata = Arc::new(MetadataStore::open_in_memory().unwrap());
        let service = JournalService::new(
            Arc::clone(&index) as Arc<dyn VectorStore>,
            Arc::clone(&metadata),
        );
        (service, index, metadata)
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_and_counters_untouched() {
        let (service, _, metadata) = fixture().await;
        metadata.upsert_document("d1", "t", "Nature", 2020, 1).await.unwrap();

        let result = service.get_journal("missing").await;
        assert!(matches!(result, Err(JournalError::NotFound(_))));

        let doc = metadata.get_document("d1").await.unwrap().unwrap();
        assert_eq!(doc.access_count, 0);
    }

    #[tokio::test]
    async fn test_journal_view_with_stats() {
        let (service, index, metadata) = fixture().await;
        metadata
            .upsert_document("d1", "Nature (2020)", "Nature", 2020, 3)
            .await
            .unwrap();
        metadata
            .upsert_chunks(&[record("c0", "d1", 0), record("c1", "d1", 1), record("c2", "d1", 2)])
            .await
            .unwrap();
        metadata
            .increment_chunk_usage(&["c1".to_string()])
            .await
            .unwrap();
        index
            .upsert_chunks(vec![
                chunk("c1", "d1", 1, Some("Methods"), "bbbb"),
                chunk("c0", "d1", 0, Some("Intro"), "aa"),
                chunk("c2", "d1", 2, Some("Methods"), "cccccc"),
            ])
            .await
            .unwrap();

        let view = service.get_journal("d1").await.unwrap();

        assert_eq!(view.title, "Nature (2020)");
        let ids: Vec<&str> = view.chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2"]);
        assert_eq!(view.stats.total_chunks, 3);
        assert_eq!(view.stats.sections.get("Methods"), Some(&2));
        assert_eq!(view.stats.most_popular_section.as_deref(), Some("Methods"));
        assert_eq!(view.stats.total_views, 1);
        assert!((view.stats.average_chunk_length - 4.0).abs() < 1e-9);
        assert_eq!(view.chunks[1].usage_count, 1);

        // successful lookup touches the access counter
        let doc = metadata.get_document("d1").await.unwrap().unwrap();
        assert_eq!(doc.access_count, 1);
    }

    #[tokio::test]
    async fn test_stats_lookup_does_not_count_as_access() {
        let (service, index, metadata) = fixture().await;
        metadata.upsert_document("d1", "t", "Nature", 2020, 1).await.unwrap();
        metadata.upsert_chunks(&[record("c0", "d1", 0)]).await.unwrap();
        index
            .upsert_chunks(vec![chunk("c0", "d1", 0, Some("Intro"), "abcd")])
            .await
            .unwrap();

        let stats = service.journal_stats("d1").await.unwrap();
        assert_eq!(stats.total_chunks, 1);
        assert_eq!(stats.sections.get("Intro"), Some(&1));

        let doc = metadata.get_document("d1").await.unwrap().unwrap();
        assert_eq!(doc.access_count, 0);
    }

    #[tokio::test]
    async fn test_document_without_chunks_is_not_found() {
        let (service, _, metadata) = fixture().await;
        metadata.upsert_document("d1", "t", "Nature", 2020, 0).await.unwrap();

        let result = service.get_journal("d1").await;
        assert!(matches!(result, Err(JournalError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_related_documents_listed() {
        let (service, index, metadata) = fixture().await;
        metadata.upsert_document("d1", "t", "Nature", 2020, 1).await.unwrap();
        metadata.upsert_document("d2", "t", "Nature", 2021, 1).await.unwrap();
        metadata.upsert_document("d3", "t", "Cell", 2021, 1).await.unwrap();
        index
            .upsert_chunks(vec![chunk("c0", "d1", 0, None, "x")])
            .await
            .unwrap();

        let view = service.get_journal("d1").await.unwrap();
        assert_eq!(view.related_documents, vec!["d2".to_string()]);
    }
}
