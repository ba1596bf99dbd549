//! Search requests, results, and generated answers.

use serde::{Deserialize, Serialize};

use super::chunk::ScoredChunk;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// A similarity search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Natural language query text
    pub query: String,

    /// Number of results to request from the index
    #[serde(default = "default_k")]
    pub k: u32,

    /// Minimum similarity score; results below it are dropped
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Exact-match journal name filter
    #[serde(default)]
    pub journal_filter: Option<String>,

    /// Exact-match publication year filter
    #[serde(default)]
    pub year_filter: Option<i32>,

    /// Whether to synthesize a cited answer from the results
    #[serde(default)]
    pub generate_answer: bool,
}

fn default_k() -> u32 {
    10
}

fn default_min_score() -> f32 {
    0.7
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: default_k(),
            min_score: default_min_score(),
            journal_filter: None,
            year_filter: None,
            generate_answer: false,
        }
    }

    #[must_use]
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    #[must_use]
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    #[must_use]
    pub fn with_journal_filter(mut self, journal: impl Into<String>) -> Self {
        self.journal_filter = Some(journal.into());
        self
    }

    #[must_use]
    pub fn with_year_filter(mut self, year: i32) -> Self {
        self.year_filter = Some(year);
        self
    }

    #[must_use]
    pub fn with_answer(mut self, generate: bool) -> Self {
        self.generate_answer = generate;
        self
    }
}

/// A single ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_id: String,
    pub text: String,
    pub similarity_score: f32,
    pub source_doc_id: String,
    pub journal_name: String,
    pub year: i32,
    pub section: Option<String>,
    pub subsection: Option<String>,
    pub page_number: Option<i32>,
    pub usage_count: i64,
}

impl From<ScoredChunk> for SearchResult {
    fn from(chunk: ScoredChunk) -> Self {
        let meta = chunk.metadata;
        Self {
            chunk_id: chunk.chunk_id,
            text: chunk.text,
            similarity_score: chunk.score,
            source_doc_id: meta.source_doc_id,
            journal_name: meta.journal_name,
            year: meta.year,
            section: meta.section,
            subsection: meta.subsection,
            page_number: meta.page_number,
            usage_count: meta.usage_count,
        }
    }
}

/// An answer synthesized from the retrieved context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub answer: String,
    /// Distinct `{journal} ({year})` strings actually cited in the answer
    pub citations: Vec<String>,
    /// Heuristic reliability estimate in [0, 1]
    pub confidence: f32,
}

/// The complete outcome of one query pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub query: String,
    pub total_results: usize,
    pub search_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_answer: Option<GeneratedAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request = SearchRequest::new("mucuna pruriens");
        assert_eq!(request.k, 10);
        assert!((request.min_score - 0.7).abs() < f32::EPSILON);
        assert!(!request.generate_answer);
    }

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new("dopamine")
            .with_k(25)
            .with_min_score(0.5)
            .with_journal_filter("Nature")
            .with_year_filter(2021)
            .with_answer(true);
        assert_eq!(request.k, 25);
        assert_eq!(request.journal_filter.as_deref(), Some("Nature"));
        assert_eq!(request.year_filter, Some(2021));
        assert!(request.generate_answer);
    }
}
