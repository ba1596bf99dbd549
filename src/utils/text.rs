//! Text cleaning for chunk storage and embedding submission.

/// Provider-safe ceiling on a single embedded text, in characters.
pub const MAX_EMBED_CHARS: usize = 8000;

/// Clean a text for submission to the embedding provider.
///
/// Collapses every whitespace run to a single space, strips NUL and BOM
/// characters, truncates to [`MAX_EMBED_CHARS`], and trims.
pub fn clean_for_embedding(text: &str) -> String {
    let stripped = strip_forbidden(text);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    // Trim after truncation: the cut can land right after a word boundary.
    truncate_chars(&collapsed, MAX_EMBED_CHARS).trim().to_string()
}

/// Clean a chunk's text before storage.
///
/// Strips NUL and BOM characters, collapses runs of spaces and tabs to a
/// single space, reduces three or more consecutive newlines to a paragraph
/// break, and trims. Idempotent.
pub fn clean_chunk_text(text: &str) -> String {
    let stripped = strip_forbidden(text);

    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    let mut newline_run = 0usize;

    for c in stripped.chars() {
        match c {
            ' ' | '\t' => pending_space = true,
            '\n' | '\r' => {
                if c == '\n' {
                    newline_run += 1;
                }
                pending_space = false;
            }
            _ => {
                if newline_run > 0 {
                    if !out.is_empty() {
                        for _ in 0..newline_run.min(2) {
                            out.push('\n');
                        }
                    }
                    newline_run = 0;
                } else if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out.trim().to_string()
}

fn strip_forbidden(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\u{0000}' && *c != '\u{feff}')
        .collect()
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_for_embedding_collapses_and_strips() {
        let cleaned = clean_for_embedding("  Mucuna   pruriens\u{0000} benefits.  ");
        assert_eq!(cleaned, "Mucuna pruriens benefits.");
    }

    #[test]
    fn test_clean_chunk_text_scenario() {
        let cleaned = clean_chunk_text("  Mucuna   pruriens\u{0000} benefits.  ");
        assert_eq!(cleaned, "Mucuna pruriens benefits.");
    }

    #[test]
    fn test_clean_chunk_text_preserves_paragraphs() {
        let cleaned = clean_chunk_text("Intro.\n\n\n\nMethods\tsection.");
        assert_eq!(cleaned, "Intro.\n\nMethods section.");
    }

    #[test]
    fn test_clean_strips_bom() {
        assert_eq!(clean_for_embedding("\u{feff}abstract"), "abstract");
        assert_eq!(clean_chunk_text("\u{feff}abstract"), "abstract");
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let samples = [
            "  Mucuna   pruriens\u{0000} benefits.  ",
            "Intro.\n\n\n\nMethods\tsection.",
            "plain",
            "",
            "   \n\n\n   ",
            "\u{feff}a\u{0000}b  c",
            "leading\n\nmiddle  end\n",
        ];
        for s in samples {
            let once = clean_for_embedding(s);
            assert_eq!(clean_for_embedding(&once), once);
            let once = clean_chunk_text(s);
            assert_eq!(clean_chunk_text(&once), once);
        }
    }

    #[test]
    fn test_truncation_ceiling() {
        let long = "a".repeat(MAX_EMBED_CHARS + 100);
        let cleaned = clean_for_embedding(&long);
        assert_eq!(cleaned.chars().count(), MAX_EMBED_CHARS);
    }

    #[test]
    fn test_truncation_leaves_no_trailing_whitespace() {
        // collapsed form is 7999 chars + " word"; the cut lands on the space
        let text = format!("{} word", "a".repeat(MAX_EMBED_CHARS - 1));
        let cleaned = clean_for_embedding(&text);
        assert_eq!(cleaned.chars().count(), MAX_EMBED_CHARS - 1);
        assert_eq!(cleaned, cleaned.trim());
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("αβγδ", 2), "αβ");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }

    #[test]
    fn test_empty_after_cleaning() {
        assert_eq!(clean_chunk_text("  \u{0000}\u{feff}  "), "");
    }
}
