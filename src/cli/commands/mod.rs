mod config;
mod ingest;
mod journal;
mod search;
mod status;

pub use config::{handle_config, ConfigCommand};
pub use ingest::{handle_ingest, IngestArgs};
pub use journal::{handle_journal, JournalArgs};
pub use search::{handle_search, SearchArgs};
pub use status::handle_status;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::Config;
use crate::services::{
    Embedder, EmbeddingClient, MetadataStore, QdrantIndex, VectorStore,
};

/// Shared collaborators constructed once per command invocation.
pub(crate) struct Collaborators {
    pub embedder: Arc<dyn Embedder>,
    pub vector_store: Arc<dyn VectorStore>,
    pub metadata: Arc<MetadataStore>,
}

pub(crate) fn connect(config: &Config) -> Result<Collaborators> {
    let embedder = EmbeddingClient::new(&config.embedding)
        .context("failed to create embedding client")?;
    let vector_store = QdrantIndex::new(
        &config.vector_store,
        u64::from(config.embedding.dimension),
    )
    .context("failed to connect to vector index")?;
    let metadata = MetadataStore::open(Path::new(&config.metadata.path))
        .context("failed to open metadata store")?;

    Ok(Collaborators {
        embedder: Arc::new(embedder),
        vector_store: Arc::new(vector_store),
        metadata: Arc::new(metadata),
    })
}
