//! Error types for the journal RAG pipelines.

use thiserror::Error;

use crate::utils::retry::Retryable;

/// Errors from the embedding provider.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("embedding provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("embedding provider returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding request timed out")]
    Timeout,
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::Timeout => true,
            EmbeddingError::Request(e) => e.is_timeout() || e.is_connect(),
            EmbeddingError::Provider { status, .. } => is_transient_status(*status),
            // A malformed or mis-sized response will not improve on retry.
            EmbeddingError::CountMismatch { .. } | EmbeddingError::InvalidResponse(_) => false,
        }
    }
}

/// Errors from the generation provider.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("generation response contained no choices")]
    EmptyResponse,

    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    #[error("generation request timed out")]
    Timeout,
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Timeout => true,
            GenerationError::Request(e) => e.is_timeout() || e.is_connect(),
            GenerationError::Provider { status, .. } => is_transient_status(*status),
            GenerationError::EmptyResponse | GenerationError::InvalidResponse(_) => false,
        }
    }
}

fn is_transient_status(status: u16) -> bool {
    status == 429 || status == 502 || status == 503 || status == 504
}

/// Errors from the vector index.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("failed to connect to vector index: {0}")]
    Connection(String),

    #[error("collection error: {0}")]
    Collection(String),

    #[error("upsert error: {0}")]
    Upsert(String),

    #[error("search error: {0}")]
    Search(String),
}

/// Errors from the SQLite metadata store.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("metadata store IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Client error: every submitted chunk was rejected during cleaning.
    #[error("no valid chunks to process: {0}")]
    NoValidChunks(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector index write failed: {0}")]
    VectorStore(#[from] VectorStoreError),
}

/// Errors surfaced by the query pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Client error: rejected before any external call.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector search failed: {0}")]
    VectorStore(#[from] VectorStoreError),
}

/// Errors surfaced by the journal lookup service.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal '{0}' not found")]
    NotFound(String),

    #[error("vector index error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("metadata store error: {0}")]
    Metadata(#[from] MetadataError),
}

/// Errors related to configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    Path(String),
}
