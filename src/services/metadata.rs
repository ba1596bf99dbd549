//! SQLite metadata store: documents, chunks, and search logs.
//!
//! Best-effort bookkeeping beside the vector index. Every operation is
//! independently transactional; counter updates are single atomic UPDATE
//! statements, never read-modify-write.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::error::MetadataError;
use crate::models::{ChunkData, ChunkRecord, DocumentRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    journal_name TEXT NOT NULL,
    year INTEGER NOT NULL,
    total_chunks INTEGER NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    last_accessed TIMESTAMP,
    access_count INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS chunks (
    chunk_id TEXT PRIMARY KEY,
    source_doc_id TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    section TEXT,
    subsection TEXT,
    page_number INTEGER,
    usage_count INTEGER DEFAULT 0,
    last_accessed TIMESTAMP,
    FOREIGN KEY (source_doc_id) REFERENCES documents (id)
);

CREATE TABLE IF NOT EXISTS search_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query TEXT NOT NULL,
    results_count INTEGER NOT NULL,
    search_time_ms INTEGER NOT NULL,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_documents_journal_year ON documents (journal_name, year);
CREATE INDEX IF NOT EXISTS idx_chunks_source_doc ON chunks (source_doc_id);
CREATE INDEX IF NOT EXISTS idx_chunks_usage ON chunks (usage_count DESC);
"#;

/// File-backed relational store of document/chunk identity and usage.
///
/// The mutex guards the connection handle; row-level atomicity comes from
/// SQLite itself.
pub struct MetadataStore {
    conn: Mutex<Connection>,
}

impl MetadataStore {
    pub fn open(path: &Path) -> Result<Self, MetadataError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        // Bundled SQLite may be built with SQLITE_DEFAULT_FOREIGN_KEYS=1;
        // pin the documented default (off) that the schema relies on.
        conn.pragma_update(None, "foreign_keys", false)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, MetadataError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", false)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert or overwrite a document record. Re-ingestion replaces the
    /// previous record, it does not merge.
    pub async fn upsert_document(
        &self,
        doc_id: &str,
        title: &str,
        journal_name: &str,
        year: i32,
        total_chunks: i64,
    ) -> Result<(), MetadataError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO documents (id, title, journal_name, year, total_chunks)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![doc_id, title, journal_name, year, total_chunks],
        )?;
        Ok(())
    }

    pub async fn get_document(&self, doc_id: &str) -> Result<Option<DocumentRecord>, MetadataError> {
        let conn = self.conn.lock().await;
        let record = conn
            .query_row(
                "SELECT id, title, journal_name, year, total_chunks, access_count,
                        created_at, last_accessed
                 FROM documents WHERE id = ?1",
                params![doc_id],
                |row| {
                    Ok(DocumentRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        journal_name: row.get(2)?,
                        year: row.get(3)?,
                        total_chunks: row.get(4)?,
                        access_count: row.get(5)?,
                        created_at: row.get(6)?,
                        last_accessed: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Atomic access-count increment plus timestamp touch.
    pub async fn touch_document_access(&self, doc_id: &str) -> Result<(), MetadataError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE documents
             SET last_accessed = CURRENT_TIMESTAMP, access_count = access_count + 1
             WHERE id = ?1",
            params![doc_id],
        )?;
        Ok(())
    }

    /// Upsert chunk rows in one transaction.
    pub async fn upsert_chunks(&self, chunks: &[ChunkData]) -> Result<(), MetadataError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO chunks
                 (chunk_id, source_doc_id, chunk_index, section, subsection, page_number)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for chunk in chunks {
                stmt.execute(params![
                    chunk.chunk_id,
                    chunk.source_doc_id,
                    chunk.chunk_index,
                    chunk.section,
                    chunk.subsection,
                    chunk.page_number,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Increment usage for every given chunk id by exactly one, as a single
    /// atomic statement.
    pub async fn increment_chunk_usage(&self, chunk_ids: &[String]) -> Result<(), MetadataError> {
        if chunk_ids.is_empty() {
            return Ok(());
        }

        let conn = self.conn.lock().await;
        let placeholders = vec!["?"; chunk_ids.len()].join(",");
        let sql = format!(
            "UPDATE chunks
             SET usage_count = usage_count + 1, last_accessed = CURRENT_TIMESTAMP
             WHERE chunk_id IN ({placeholders})"
        );
        conn.execute(&sql, rusqlite::params_from_iter(chunk_ids.iter()))?;
        Ok(())
    }

    pub async fn chunks_for_document(
        &self,
        doc_id: &str,
    ) -> Result<Vec<ChunkRecord>, MetadataError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT chunk_id, source_doc_id, chunk_index, section, subsection, page_number,
                    usage_count, last_accessed
             FROM chunks WHERE source_doc_id = ?1 ORDER BY chunk_index",
        )?;
        let rows = stmt.query_map(params![doc_id], |row| {
            Ok(ChunkRecord {
                chunk_id: row.get(0)?,
                source_doc_id: row.get(1)?,
                chunk_index: row.get(2)?,
                section: row.get(3)?,
                subsection: row.get(4)?,
                page_number: row.get(5)?,
                usage_count: row.get(6)?,
                last_accessed: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Other document ids published in the same journal.
    pub async fn related_documents(
        &self,
        journal_name: &str,
        exclude_doc_id: &str,
    ) -> Result<Vec<String>, MetadataError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id FROM documents
             WHERE journal_name = ?1 AND id != ?2
             ORDER BY year DESC, id",
        )?;
        let rows = stmt.query_map(params![journal_name, exclude_doc_id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Append-only search log entry.
    pub async fn log_search(
        &self,
        query: &str,
        results_count: usize,
        search_time_ms: u64,
    ) -> Result<(), MetadataError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO search_logs (query, results_count, search_time_ms)
             VALUES (?1, ?2, ?3)",
            params![query, results_count as i64, search_time_ms as i64],
        )?;
        Ok(())
    }

    pub async fn search_log_count(&self) -> Result<i64, MetadataError> {
        let conn = self.conn.lock().await;
        let count = conn.query_row("SELECT COUNT(*) FROM search_logs", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, doc: &str, index: u32) -> ChunkData {
        ChunkData {
            chunk_id: id.to_string(),
            text: "text".to_string(),
            chunk_index: index,
            source_doc_id: doc.to_string(),
            journal_name: "J".to_string(),
            year: 2023,
            section: Some("Intro".to_string()),
            subsection: None,
            page_number: Some(1),
        }
    }

    #[tokio::test]
    async fn test_document_upsert_overwrites() {
        let store = MetadataStore::open_in_memory().unwrap();
        store.upsert_document("d1", "J (2023)", "J", 2023, 4).await.unwrap();
        store.upsert_document("d1", "J (2024)", "J", 2024, 2).await.unwrap();

        let doc = store.get_document("d1").await.unwrap().unwrap();
        assert_eq!(doc.title, "J (2024)");
        assert_eq!(doc.total_chunks, 2);
    }

    #[tokio::test]
    async fn test_missing_document_is_none() {
        let store = MetadataStore::open_in_memory().unwrap();
        assert!(store.get_document("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_access_touch_increments() {
        let store = MetadataStore::open_in_memory().unwrap();
        store.upsert_document("d1", "t", "J", 2023, 1).await.unwrap();
        store.touch_document_access("d1").await.unwrap();
        store.touch_document_access("d1").await.unwrap();

        let doc = store.get_document("d1").await.unwrap().unwrap();
        assert_eq!(doc.access_count, 2);
        assert!(doc.last_accessed.is_some());
    }

    #[tokio::test]
    async fn test_chunk_listing_ordered_by_index() {
        let store = MetadataStore::open_in_memory().unwrap();
        store
            .upsert_chunks(&[chunk("c2", "d1", 2), chunk("c0", "d1", 0), chunk("c1", "d1", 1)])
            .await
            .unwrap();

        let chunks = store.chunks_for_document("d1").await.unwrap();
        let ids: Vec<&str> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2"]);
    }

    #[tokio::test]
    async fn test_chunk_upsert_overwrites_not_duplicates() {
        let store = MetadataStore::open_in_memory().unwrap();
        store.upsert_chunks(&[chunk("c1", "d1", 0)]).await.unwrap();
        store.upsert_chunks(&[chunk("c1", "d1", 5)]).await.unwrap();

        let chunks = store.chunks_for_document("d1").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 5);
    }

    #[tokio::test]
    async fn test_usage_increment_is_exactly_one_per_query() {
        let store = MetadataStore::open_in_memory().unwrap();
        store
            .upsert_chunks(&[chunk("c1", "d1", 0), chunk("c2", "d1", 1)])
            .await
            .unwrap();

        store
            .increment_chunk_usage(&["c1".to_string(), "c2".to_string()])
            .await
            .unwrap();
        store.increment_chunk_usage(&["c1".to_string()]).await.unwrap();

        let chunks = store.chunks_for_document("d1").await.unwrap();
        assert_eq!(chunks[0].usage_count, 2);
        assert_eq!(chunks[1].usage_count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_usage_increments_lose_no_updates() {
        let store = std::sync::Arc::new(MetadataStore::open_in_memory().unwrap());
        store
            .upsert_chunks(&[chunk("c1", "d1", 0), chunk("c2", "d1", 1)])
            .await
            .unwrap();

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    // every task touches c1, every other task also touches c2
                    let mut ids = vec!["c1".to_string()];
                    if i % 2 == 0 {
                        ids.push("c2".to_string());
                    }
                    store.increment_chunk_usage(&ids).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let chunks = store.chunks_for_document("d1").await.unwrap();
        assert_eq!(chunks[0].usage_count, 16);
        assert_eq!(chunks[1].usage_count, 8);
    }

    #[tokio::test]
    async fn test_usage_increment_empty_is_noop() {
        let store = MetadataStore::open_in_memory().unwrap();
        store.increment_chunk_usage(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_related_documents_same_journal_only() {
        let store = MetadataStore::open_in_memory().unwrap();
        store.upsert_document("d1", "t", "Nature", 2020, 1).await.unwrap();
        store.upsert_document("d2", "t", "Nature", 2021, 1).await.unwrap();
        store.upsert_document("d3", "t", "Cell", 2021, 1).await.unwrap();

        let related = store.related_documents("Nature", "d1").await.unwrap();
        assert_eq!(related, vec!["d2".to_string()]);
    }

    #[tokio::test]
    async fn test_search_log_appends() {
        let store = MetadataStore::open_in_memory().unwrap();
        store.log_search("mucuna", 3, 120).await.unwrap();
        store.log_search("dopamine", 0, 40).await.unwrap();
        assert_eq!(store.search_log_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.db");

        {
            let store = MetadataStore::open(&path).unwrap();
            store.upsert_document("d1", "t", "J", 2023, 1).await.unwrap();
        }

        let store = MetadataStore::open(&path).unwrap();
        assert!(store.get_document("d1").await.unwrap().is_some());
    }
}
