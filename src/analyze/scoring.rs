//! Weighted keyword scoring.
//!
//! Every lexicon term found in the text adds its weight once; there is no
//! early exit, so evaluation order never changes the sum. The total is capped
//! at the per-article maximum.

use crate::keywords::KeywordTable;

/// Cap used when nothing else is configured.
pub const DEFAULT_MAX_SCORE: u32 = 6;

/// Uncapped sum of matched weights. `text_lower` must already be lowercased.
pub fn raw_score(text_lower: &str, table: &KeywordTable) -> u32 {
    table
        .weighted_terms()
        .iter()
        .filter(|w| w.term.found_in(text_lower))
        .map(|w| w.weight)
        .sum()
}

/// Score in `[0, cap]`.
pub fn score_text(text_lower: &str, table: &KeywordTable, cap: u32) -> u32 {
    raw_score(text_lower, table).min(cap)
}
