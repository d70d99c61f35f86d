//! Relevance gate: an entry must mention at least one domain term.

use crate::keywords::KeywordTable;

/// `text_lower` must already be lowercased.
pub fn passes_gate(text_lower: &str, table: &KeywordTable) -> bool {
    table.domain_terms().iter().any(|t| t.found_in(text_lower))
}
