mod chunk;
mod config;
mod ingest;
mod journal;
mod search;

pub use chunk::{ChunkData, ChunkMetadata, EmbeddedChunk, ScoredChunk, MIN_PUBLICATION_YEAR};
pub use config::{
    Config, EmbeddingConfig, GenerationConfig, MetadataConfig, SearchConfig, VectorStoreConfig,
    DEFAULT_COLLECTION, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_GENERATION_MODEL, DEFAULT_QDRANT_URL,
};
pub use ingest::IngestReport;
pub use journal::{ChunkRecord, DocumentRecord, JournalStats, JournalView};
pub use search::{GeneratedAnswer, OutputFormat, SearchRequest, SearchResponse, SearchResult};
