//! Output formatting for search responses.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use groundcrew_core::search::{CorpusStats, SearchResponse};

/// Formats a search response as pretty-printed JSON.
///
/// The response already serializes to the wire contract; the query is
/// attached alongside for scripting convenience.
pub fn format_json(query: &str, response: &SearchResponse) -> String {
    let output = serde_json::json!({
        "query": query,
        "response": response,
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a search response for human-readable terminal output.
pub fn format_human(query: &str, response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return format!(
            "No results found for \"{}\" (mode: {})",
            query,
            response.mode.as_str()
        );
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Found {} result{} for \"{}\" (mode: {}):\n\n",
        response.results.len(),
        if response.results.len() == 1 { "" } else { "s" },
        query,
        response.mode.as_str()
    ));

    for (i, hit) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} (score: {:.2})\n",
            i + 1,
            hit.title,
            hit.score
        ));

        let mut provenance = Vec::new();
        if let Some(source) = &hit.source {
            provenance.push(format!("source: {}", source));
        }
        if let Some(category) = &hit.category {
            provenance.push(format!("category: {}", category));
        }
        if let (Some(index), Some(total)) = (hit.chunk_index, hit.total_chunks) {
            provenance.push(format!("chunk {}/{}", index + 1, total));
        }
        if !provenance.is_empty() {
            output.push_str(&format!("   [{}]\n", provenance.join(", ")));
        }

        output.push_str(&format!("   {}\n\n", hit.snippet));
    }

    output.trim_end().to_string()
}

/// Formats corpus statistics.
pub fn format_stats(stats: &CorpusStats) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} documents, {} with embeddings\n",
        stats.total_documents, stats.embedded_documents
    ));
    if !stats.category_counts.is_empty() {
        output.push_str("Categories:\n");
        for (category, count) in &stats.category_counts {
            output.push_str(&format!("  {}: {}\n", category, count));
        }
    }
    output.trim_end().to_string()
}
