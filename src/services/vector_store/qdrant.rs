//! Qdrant vector index backend.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use uuid::Uuid;

use super::{SearchFilter, VectorStore};
use crate::error::VectorStoreError;
use crate::models::{ChunkMetadata, EmbeddedChunk, ScoredChunk, VectorStoreConfig};

/// Qdrant-backed vector index over a cosine-distance collection.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    embedding_dim: u64,
}

impl QdrantIndex {
    pub fn new(config: &VectorStoreConfig, embedding_dim: u64) -> Result<Self, VectorStoreError> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
            embedding_dim,
        })
    }

    /// Deterministic point id for a caller-assigned chunk id. Re-ingesting
    /// the same chunk id maps to the same point and overwrites it.
    fn point_id(chunk_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
    }

    fn build_filter(filter: &SearchFilter) -> Option<Filter> {
        let mut conditions: Vec<Condition> = Vec::new();

        if let Some(ref journal) = filter.journal_name {
            conditions.push(Condition::matches("journal_name", journal.clone()));
        }
        if let Some(year) = filter.year {
            conditions.push(Condition::matches("year", i64::from(year)));
        }

        if conditions.is_empty() {
            None
        } else {
            Some(Filter::must(conditions))
        }
    }

    fn payload_for(chunk_id: &str, text: &str, meta: &ChunkMetadata) -> HashMap<String, Value> {
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert("chunk_id".to_string(), chunk_id.to_string().into());
        payload.insert("text".to_string(), text.to_string().into());
        payload.insert(
            "source_doc_id".to_string(),
            meta.source_doc_id.clone().into(),
        );
        payload.insert("journal_name".to_string(), meta.journal_name.clone().into());
        payload.insert("year".to_string(), i64::from(meta.year).into());
        if let Some(ref section) = meta.section {
            payload.insert("section".to_string(), section.clone().into());
        }
        if let Some(ref subsection) = meta.subsection {
            payload.insert("subsection".to_string(), subsection.clone().into());
        }
        if let Some(page) = meta.page_number {
            payload.insert("page_number".to_string(), i64::from(page).into());
        }
        payload.insert("chunk_index".to_string(), i64::from(meta.chunk_index).into());
        payload.insert("usage_count".to_string(), meta.usage_count.into());
        payload
    }

    fn chunk_from_payload(payload: &HashMap<String, Value>, score: f32) -> ScoredChunk {
        let metadata = ChunkMetadata {
            source_doc_id: payload_str(payload, "source_doc_id").unwrap_or_default(),
            journal_name: payload_str(payload, "journal_name").unwrap_or_default(),
            year: payload_i64(payload, "year").unwrap_or(0) as i32,
            section: payload_str(payload, "section"),
            subsection: payload_str(payload, "subsection"),
            page_number: payload_i64(payload, "page_number").map(|p| p as i32),
            chunk_index: payload_i64(payload, "chunk_index").unwrap_or(0) as u32,
            usage_count: payload_i64(payload, "usage_count").unwrap_or(0),
        };

        ScoredChunk {
            chunk_id: payload_str(payload, "chunk_id").unwrap_or_default(),
            text: payload_str(payload, "text").unwrap_or_default(),
            // Cosine similarity should already land in [0, 1]; clamp rather
            // than propagate an out-of-range score from another metric.
            score: score.clamp(0.0, 1.0),
            metadata,
        }
    }
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(|v| match &v.kind {
        Some(qdrant_client::qdrant::value::Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    })
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
    payload.get(key).and_then(|v| match &v.kind {
        Some(qdrant_client::qdrant::value::Kind::IntegerValue(n)) => Some(*n),
        _ => None,
    })
}

#[async_trait]
impl VectorStore for QdrantIndex {
    async fn health_check(&self) -> Result<bool, VectorStoreError> {
        self.client
            .health_check()
            .await
            .map(|_| true)
            .map_err(|e| VectorStoreError::Connection(e.to_string()))
    }

    async fn create_collection(&self) -> Result<(), VectorStoreError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
        if exists {
            return Ok(());
        }

        let create = CreateCollectionBuilder::new(&self.collection)
            .vectors_config(VectorParamsBuilder::new(self.embedding_dim, Distance::Cosine));

        self.client
            .create_collection(create)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;

        Ok(())
    }

    async fn upsert_chunks(&self, chunks: Vec<EmbeddedChunk>) -> Result<(), VectorStoreError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = chunks
            .into_iter()
            .map(|chunk| {
                let payload = Self::payload_for(&chunk.chunk_id, &chunk.text, &chunk.metadata);
                PointStruct::new(Self::point_id(&chunk.chunk_id), chunk.vector, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        query_vector: Vec<f32>,
        k: u64,
        filter: &SearchFilter,
    ) -> Result<Vec<ScoredChunk>, VectorStoreError> {
        let mut search =
            SearchPointsBuilder::new(&self.collection, query_vector, k).with_payload(true);

        if let Some(f) = Self::build_filter(filter) {
            search = search.filter(f);
        }

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorStoreError::Search(e.to_string()))?;

        Ok(response
            .result
            .into_iter()
            .map(|point| Self::chunk_from_payload(&point.payload, point.score))
            .collect())
    }

    async fn chunks_by_source(
        &self,
        source_doc_id: &str,
    ) -> Result<Vec<ScoredChunk>, VectorStoreError> {
        let filter = Filter::must([Condition::matches(
            "source_doc_id",
            source_doc_id.to_string(),
        )]);

        let mut chunks: Vec<ScoredChunk> = Vec::new();
        let mut offset: Option<qdrant_client::qdrant::PointId> = None;

        loop {
            let mut scroll = ScrollPointsBuilder::new(&self.collection)
                .filter(filter.clone())
                .limit(256)
                .with_payload(true)
                .with_vectors(false);

            if let Some(off) = offset {
                scroll = scroll.offset(off);
            }

            let response = self
                .client
                .scroll(scroll)
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;

            if response.result.is_empty() {
                break;
            }

            chunks.extend(
                response
                    .result
                    .iter()
                    .map(|point| Self::chunk_from_payload(&point.payload, 1.0)),
            );

            offset = response.next_page_offset;
            if offset.is_none() {
                break;
            }
        }

        chunks.sort_by_key(|c| c.metadata.chunk_index);
        Ok(chunks)
    }
}
