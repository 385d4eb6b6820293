//! Plain-text rendering of Kagi results

use crate::kagi::{SearchOutcome, SummaryOutcome};
use std::fmt::Write;

/// Render search results as a numbered list, followed by related searches
#[must_use]
pub fn render_search(query: &str, outcome: &SearchOutcome) -> String {
    let mut output = format!("Search results for '{query}':\n\n");

    // Writing into a String cannot fail.
    for (i, item) in outcome.items.iter().enumerate() {
        let _ = writeln!(output, "{}. {}", i + 1, item.title);
        let _ = writeln!(output, "   URL: {}", item.url);
        if !item.published_at.is_empty() {
            let _ = writeln!(output, "   Published: {}", item.published_at);
        }
        let _ = writeln!(output, "   {}\n", item.snippet);
    }

    if !outcome.related_terms.is_empty() {
        output.push_str("Related searches:\n");
        for (i, term) in outcome.related_terms.iter().enumerate() {
            let _ = writeln!(output, "{}. {term}", i + 1);
        }
    }

    output
}

/// Render a summary under a header naming the source URL
#[must_use]
pub fn render_summary(url: &str, outcome: &SummaryOutcome) -> String {
    format!("Summary of {url}:\n\n{}", outcome.text)
}
