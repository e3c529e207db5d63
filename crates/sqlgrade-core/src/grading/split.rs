//! Splits a submission blob into its numbered sub-queries.
//!
//! Students separate answers with marker lines such as `# number 2`. The
//! numeral after `number` is informational only: segments come back in the
//! order the markers appear in the text.

use regex::Regex;
use std::sync::OnceLock;

/// Case-insensitive `#`, `number`, digits. Whitespace between the parts is optional.
const MARKER_PATTERN: &str = r"(?i)#\s*number\s*\d+";

fn marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MARKER_PATTERN).expect("marker pattern is a valid regex"))
}

/// Splits `text` at every marker and normalizes each segment so it ends with
/// exactly one `;`. Whitespace-only segments (including a blank preamble
/// before the first marker) are dropped.
pub fn split_queries(text: &str) -> Vec<String> {
    marker()
        .split(text)
        .filter_map(normalize_segment)
        .collect()
}

// Emptiness is judged before the terminator is stripped: a lone `;` is still
// an answer and keeps its position.
fn normalize_segment(segment: &str) -> Option<String> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return None;
    }
    let body = trimmed.trim_end_matches(';').trim_end();
    Some(format!("{body};"))
}

/// Number of markers in `text`, regardless of what follows them.
pub fn count_markers(text: &str) -> usize {
    marker().find_iter(text).count()
}
