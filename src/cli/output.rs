//! Output formatting for CLI results.

use std::fmt::Write as FmtWrite;

use crate::models::{IngestReport, JournalStats, JournalView, OutputFormat, SearchResponse};

pub trait Formatter {
    fn format_search_response(&self, response: &SearchResponse) -> String;
    fn format_ingest_report(&self, report: &IngestReport) -> String;
    fn format_journal(&self, journal: &JournalView) -> String;
    fn format_journal_stats(&self, stats: &JournalStats) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusInfo {
    pub vector_store_url: String,
    pub collection: String,
    pub vector_store_connected: bool,
    pub metadata_path: String,
    pub metadata_reachable: bool,
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_search_response(&self, response: &SearchResponse) -> String {
        if response.results.is_empty() {
            return format!("No results found for: {}\n", response.query);
        }

        let mut output = String::new();
        writeln!(output, "Search results for: \"{}\"", response.query).unwrap();
        writeln!(
            output,
            "Found {} results in {}ms\n",
            response.total_results, response.search_time_ms
        )
        .unwrap();

        for (i, result) in response.results.iter().enumerate() {
            writeln!(
                output,
                "{}. [Score: {:.3}] {} ({})",
                i + 1,
                result.similarity_score,
                result.journal_name,
                result.year
            )
            .unwrap();
            if let Some(ref section) = result.section {
                writeln!(output, "   Section: {}", section).unwrap();
            }
            writeln!(output, "   Chunk: {} (used {}x)", result.chunk_id, result.usage_count)
                .unwrap();

            let preview: String = result.text.chars().take(200).collect();
            let preview = if result.text.chars().count() > 200 {
                format!("{}...", preview)
            } else {
                preview
            };
            for line in preview.lines() {
                writeln!(output, "   {}", line).unwrap();
            }
            writeln!(output).unwrap();
        }

        if let Some(ref answer) = response.generated_answer {
            writeln!(output, "Answer (confidence {:.2}):", answer.confidence).unwrap();
            for line in answer.answer.lines() {
                writeln!(output, "  {}", line).unwrap();
            }
            if !answer.citations.is_empty() {
                writeln!(output, "  Citations: {}", answer.citations.join("; ")).unwrap();
            }
        }

        output
    }

    fn format_ingest_report(&self, report: &IngestReport) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "Ingested {} of {} chunks in {}ms",
            report.processed_chunks,
            report.total_chunks(),
            report.elapsed_ms
        )
        .unwrap();
        if report.failed_chunks > 0 {
            writeln!(output, "Failed: {}", report.failed_chunks).unwrap();
            for error in &report.errors {
                writeln!(output, "  - {}", error).unwrap();
            }
        }
        output
    }

    fn format_journal(&self, journal: &JournalView) -> String {
        let mut output = String::new();
        writeln!(output, "{} [{}]", journal.title, journal.journal_id).unwrap();
        output.push_str(&self.format_journal_stats(&journal.stats));
        if !journal.related_documents.is_empty() {
            writeln!(output, "Related: {}", journal.related_documents.join(", ")).unwrap();
        }
        output
    }

    fn format_journal_stats(&self, stats: &JournalStats) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "{} chunks, {} total views, avg length {:.0} chars",
            stats.total_chunks, stats.total_views, stats.average_chunk_length
        )
        .unwrap();
        if let Some(ref section) = stats.most_popular_section {
            writeln!(output, "Most covered section: {}", section).unwrap();
        }
        for (section, count) in &stats.sections {
            writeln!(output, "  {}: {} chunks", section, count).unwrap();
        }
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();
        let index_state = if status.vector_store_connected {
            "[OK]"
        } else {
            "[DOWN]"
        };
        writeln!(
            output,
            "Vector index:   {} {} ({})",
            index_state, status.vector_store_url, status.collection
        )
        .unwrap();
        let meta_state = if status.metadata_reachable {
            "[OK]"
        } else {
            "[DOWN]"
        };
        writeln!(output, "Metadata store: {} {}", meta_state, status.metadata_path).unwrap();
        output
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}\n", message)
    }
}

pub struct JsonFormatter;

impl JsonFormatter {
    fn to_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .map(|s| format!("{}\n", s))
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}\n", e))
    }
}

impl Formatter for JsonFormatter {
    fn format_search_response(&self, response: &SearchResponse) -> String {
        Self::to_json(response)
    }

    fn format_ingest_report(&self, report: &IngestReport) -> String {
        Self::to_json(report)
    }

    fn format_journal(&self, journal: &JournalView) -> String {
        Self::to_json(journal)
    }

    fn format_journal_stats(&self, stats: &JournalStats) -> String {
        Self::to_json(stats)
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        Self::to_json(status)
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&serde_json::json!({ "message": message }))
    }
}
