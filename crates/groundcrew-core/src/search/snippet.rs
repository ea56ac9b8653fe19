//! Snippet shaping for search hits.

/// Ellipsis marker appended to truncated snippets.
const ELLIPSIS: &str = "...";

/// Truncates content to at most `max_chars` characters.
///
/// Counts characters, not bytes, so multibyte content never splits inside
/// a code point. Trailing whitespace before the ellipsis is dropped.
pub fn make_snippet(content: &str, max_chars: usize) -> String {
    let mut chars = content.char_indices();
    match chars.nth(max_chars) {
        None => content.to_string(),
        Some((boundary, _)) => {
            let mut snippet = content[..boundary].trim_end().to_string();
            snippet.push_str(ELLIPSIS);
            snippet
        }
    }
}
