//! Cited answer synthesis over a retrieved context set.

use std::sync::Arc;

use crate::error::GenerationError;
use crate::models::{GeneratedAnswer, SearchResult};
use crate::services::generation::Generator;

/// Number of context chunks at which the corroboration factor saturates.
const CORROBORATION_SATURATION: usize = 5;

const SYSTEM_PROMPT: &str = "\
You are a helpful research assistant that provides accurate, well-cited answers \
based on scientific literature.

Guidelines:
1. Only answer based on the provided context
2. Always cite sources using [Source X] format
3. If information is insufficient, say so clearly
4. Be concise but comprehensive
5. Maintain scientific accuracy
6. If multiple sources agree, mention that
7. If sources disagree, mention the disagreement";

/// Synthesizes a grounded answer from ranked context chunks.
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Generate an answer for `query` grounded in `context`, in context order.
    ///
    /// The returned citations name only the sources the answer actually
    /// references; confidence reflects context quality and quantity.
    pub async fn synthesize(
        &self,
        query: &str,
        context: &[SearchResult],
    ) -> Result<GeneratedAnswer, GenerationError> {
        let prompt = build_prompt(query, context);
        let answer = self.generator.complete(SYSTEM_PROMPT, &prompt).await?;

        Ok(GeneratedAnswer {
            citations: extract_citations(&answer, context),
            confidence: confidence_score(context),
            answer,
        })
    }
}

/// Build the user turn: labeled context blocks followed by the question.
fn build_prompt(query: &str, context: &[SearchResult]) -> String {
    let mut blocks = Vec::with_capacity(context.len());
    for (i, chunk) in context.iter().enumerate() {
        blocks.push(format!(
            "[Source {}: {} ({})]\n{}\n",
            i + 1,
            chunk.journal_name,
            chunk.year,
            chunk.text
        ));
    }

    format!(
        "Based on the following research context, please answer the question.\n\
         If the context doesn't contain enough information to answer the question, please say so.\n\
         Always cite your sources using the format [Source X] when referencing information.\n\n\
         Context:\n{}\n\nQuestion: {}\n\nAnswer:",
        blocks.join("\n"),
        query
    )
}

/// Map every `[Source i]` token present in the answer back to its context
/// chunk's `{journal} ({year})` string, deduplicated in first-occurrence order.
fn extract_citations(answer: &str, context: &[SearchResult]) -> Vec<String> {
    let mut citations: Vec<String> = Vec::new();
    for (i, chunk) in context.iter().enumerate() {
        let token = format!("[Source {}]", i + 1);
        if answer.contains(&token) {
            let citation = format!("{} ({})", chunk.journal_name, chunk.year);
            if !citations.contains(&citation) {
                citations.push(citation);
            }
        }
    }
    citations
}

/// Confidence = 0.7 * mean similarity + 0.3 * min(n/5, 1), clamped to 1.0.
///
/// Rewards a tight textual match and corroborating sources, saturating at
/// five sources. Empty context scores exactly 0.
fn confidence_score(context: &[SearchResult]) -> f32 {
    if context.is_empty() {
        return 0.0;
    }

    let avg_similarity: f32 =
        context.iter().map(|c| c.similarity_score).sum::<f32>() / context.len() as f32;
    let count_factor = (context.len() as f32 / CORROBORATION_SATURATION as f32).min(1.0);

    (avg_similarity * 0.7 + count_factor * 0.3).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(journal: &str, year: i32, score: f32) -> SearchResult {
        SearchResult {
            chunk_id: format!("{journal}-{year}-{score}"),
            text: "chunk text".to_string(),
            similarity_score: score,
            source_doc_id: "d1".to_string(),
            journal_name: journal.to_string(),
            year,
            section: None,
            subsection: None,
            page_number: None,
            usage_count: 0,
        }
    }

    #[test]
    fn test_prompt_labels_sources_in_order() {
        let context = vec![result("Nature", 2020, 0.9), result("Cell", 2021, 0.8)];
        let prompt = build_prompt("what?", &context);
        assert!(prompt.contains("[Source 1: Nature (2020)]"));
        assert!(prompt.contains("[Source 2: Cell (2021)]"));
        assert!(prompt.find("[Source 1:").unwrap() < prompt.find("[Source 2:").unwrap());
        assert!(prompt.contains("Question: what?"));
    }

    #[test]
    fn test_extract_citations_only_referenced() {
        let context = vec![result("Nature", 2020, 0.9), result("Cell", 2021, 0.8)];
        let citations = extract_citations("Per [Source 2], yes.", &context);
        assert_eq!(citations, vec!["Cell (2021)".to_string()]);
    }

    #[test]
    fn test_extract_citations_dedupes_same_journal_year() {
        let context = vec![result("J", 2023, 0.9), result("J", 2023, 0.8)];
        let citations = extract_citations("See [Source 1] and [Source 2].", &context);
        assert_eq!(citations, vec!["J (2023)".to_string()]);
    }

    #[test]
    fn test_extract_citations_ignores_out_of_range_tokens() {
        let context = vec![result("J", 2023, 0.9)];
        let citations = extract_citations("[Source 1] and [Source 7]", &context);
        assert_eq!(citations.len(), 1);
    }

    #[test]
    fn test_confidence_empty_context_is_zero() {
        assert_eq!(confidence_score(&[]), 0.0);
    }

    #[test]
    fn test_confidence_matches_formula() {
        let context = vec![result("J", 2023, 0.8), result("J", 2023, 0.6)];
        // 0.7 * 0.7 + 0.3 * (2/5)
        let expected = 0.7 * 0.7 + 0.3 * 0.4;
        assert!((confidence_score(&context) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_saturates_and_stays_bounded() {
        let context: Vec<SearchResult> = (0..8).map(|_| result("J", 2023, 1.0)).collect();
        let score = confidence_score(&context);
        assert!((score - 1.0).abs() < 1e-6);
        assert!(score <= 1.0);
    }
}
