mod embedding;
mod generation;
mod ingest;
mod journal;
mod metadata;
mod query;
mod synthesizer;
mod vector_store;

pub use embedding::{Embedder, EmbeddingClient};
pub use generation::{GenerationClient, Generator};
pub use ingest::IngestPipeline;
pub use journal::JournalService;
pub use metadata::MetadataStore;
pub use query::QueryPipeline;
pub use synthesizer::AnswerSynthesizer;
pub use vector_store::{QdrantIndex, SearchFilter, VectorStore};

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory stand-ins for the external collaborators.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::error::{EmbeddingError, GenerationError, VectorStoreError};
    use crate::models::{EmbeddedChunk, ScoredChunk};

    use super::embedding::Embedder;
    use super::generation::Generator;
    use super::vector_store::{SearchFilter, VectorStore};

    /// Deterministic embedder; optionally fails every call.
    #[derive(Default)]
    pub struct MockEmbedder {
        fail: bool,
    }

    impl MockEmbedder {
        pub fn failing() -> Self {
            Self { fail: true }
        }

        fn vector_for(text: &str) -> Vec<f32> {
            vec![text.len() as f32, 1.0, 0.0]
        }
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed_documents(
            &self,
            texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if self.fail {
                return Err(EmbeddingError::Provider {
                    status: 500,
                    message: "mock embedder down".to_string(),
                });
            }
            Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if self.fail {
                return Err(EmbeddingError::Provider {
                    status: 500,
                    message: "mock embedder down".to_string(),
                });
            }
            Ok(Self::vector_for(text))
        }
    }

    /// In-memory vector index with preset search rankings.
    #[derive(Default)]
    pub struct MockVectorIndex {
        chunks: Mutex<HashMap<String, EmbeddedChunk>>,
        search_results: Mutex<Vec<ScoredChunk>>,
        last_filter: Mutex<Option<SearchFilter>>,
    }

    impl MockVectorIndex {
        pub async fn set_search_results(&self, results: Vec<ScoredChunk>) {
            *self.search_results.lock().await = results;
        }

        pub async fn last_filter(&self) -> Option<SearchFilter> {
            self.last_filter.lock().await.clone()
        }

        pub async fn get(&self, chunk_id: &str) -> Option<EmbeddedChunk> {
            self.chunks.lock().await.get(chunk_id).cloned()
        }

        pub async fn len(&self) -> usize {
            self.chunks.lock().await.len()
        }
    }

    #[async_trait]
    impl VectorStore for MockVectorIndex {
        async fn health_check(&self) -> Result<bool, VectorStoreError> {
            Ok(true)
        }

        async fn create_collection(&self) -> Result<(), VectorStoreError> {
            Ok(())
        }

        async fn upsert_chunks(&self, chunks: Vec<EmbeddedChunk>) -> Result<(), VectorStoreError> {
            let mut stored = self.chunks.lock().await;
            for chunk in chunks {
                stored.insert(chunk.chunk_id.clone(), chunk);
            }
            Ok(())
        }

        async fn search(
            &self,
            _query_vector: Vec<f32>,
            k: u64,
            filter: &SearchFilter,
        ) -> Result<Vec<ScoredChunk>, VectorStoreError> {
            *self.last_filter.lock().await = Some(filter.clone());
            let results = self.search_results.lock().await;
            Ok(results.iter().take(k as usize).cloned().collect())
        }

        async fn chunks_by_source(
            &self,
            source_doc_id: &str,
        ) -> Result<Vec<ScoredChunk>, VectorStoreError> {
            let stored = self.chunks.lock().await;
            let mut chunks: Vec<ScoredChunk> = stored
                .values()
                .filter(|c| c.metadata.source_doc_id == source_doc_id)
                .map(|c| ScoredChunk {
                    chunk_id: c.chunk_id.clone(),
                    text: c.text.clone(),
                    score: 1.0,
                    metadata: c.metadata.clone(),
                })
                .collect();
            chunks.sort_by_key(|c| c.metadata.chunk_index);
            Ok(chunks)
        }
    }

    /// Vector index whose writes always fail.
    pub struct FailingVectorIndex;

    #[async_trait]
    impl VectorStore for FailingVectorIndex {
        async fn health_check(&self) -> Result<bool, VectorStoreError> {
            Ok(false)
        }

        async fn create_collection(&self) -> Result<(), VectorStoreError> {
            Err(VectorStoreError::Collection("mock index down".to_string()))
        }

        async fn upsert_chunks(&self, _chunks: Vec<EmbeddedChunk>) -> Result<(), VectorStoreError> {
            Err(VectorStoreError::Upsert("mock index down".to_string()))
        }

        async fn search(
            &self,
            _query_vector: Vec<f32>,
            _k: u64,
            _filter: &SearchFilter,
        ) -> Result<Vec<ScoredChunk>, VectorStoreError> {
            Err(VectorStoreError::Search("mock index down".to_string()))
        }

        async fn chunks_by_source(
            &self,
            _source_doc_id: &str,
        ) -> Result<Vec<ScoredChunk>, VectorStoreError> {
            Err(VectorStoreError::Search("mock index down".to_string()))
        }
    }

    /// Generator returning a canned answer, counting invocations.
    pub struct MockGenerator {
        answer: Option<String>,
        invocations: AtomicU32,
    }

    impl MockGenerator {
        pub fn answering(answer: &str) -> Self {
            Self {
                answer: Some(answer.to_string()),
                invocations: AtomicU32::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                answer: None,
                invocations: AtomicU32::new(0),
            }
        }

        pub async fn calls(&self) -> u32 {
            self.invocations.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for MockGenerator {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, GenerationError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            match &self.answer {
                Some(answer) => Ok(answer.clone()),
                None => Err(GenerationError::Provider {
                    status: 503,
                    message: "mock generator down".to_string(),
                }),
            }
        }
    }
}
