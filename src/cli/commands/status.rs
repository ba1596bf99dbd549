use std::path::Path;

use anyhow::Result;

use crate::cli::output::{get_formatter, StatusInfo};
use crate::models::{Config, OutputFormat};
use crate::services::{MetadataStore, QdrantIndex, VectorStore};

pub async fn handle_status(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let vector_store_connected = match QdrantIndex::new(
        &config.vector_store,
        u64::from(config.embedding.dimension),
    ) {
        Ok(index) => index.health_check().await.unwrap_or(false),
        Err(_) => false,
    };

    let metadata_reachable = MetadataStore::open(Path::new(&config.metadata.path)).is_ok();

    let status = StatusInfo {
        vector_store_url: config.vector_store.url.clone(),
        collection: config.vector_store.collection.clone(),
        vector_store_connected,
        metadata_path: config.metadata.path.clone(),
        metadata_reachable,
    };

    print!("{}", formatter.format_status(&status));
    Ok(())
}
