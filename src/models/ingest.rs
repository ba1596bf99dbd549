//! Ingestion outcome reporting.

use serde::{Deserialize, Serialize};

/// Per-batch accounting for one ingestion run.
///
/// `processed_chunks + failed_chunks` always equals the number of submitted
/// chunks; every input is accounted for exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub processed_chunks: usize,
    pub failed_chunks: usize,
    pub errors: Vec<String>,
    pub elapsed_ms: u64,
}

impl IngestReport {
    pub fn total_chunks(&self) -> usize {
        self.processed_chunks + self.failed_chunks
    }
}
