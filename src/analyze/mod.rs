// src/analyze/mod.rs
//! Per-entry classification: noise filter → relevance gate → scorer.
//!
//! Diagnostics are accumulated into an explicit `FilterStats` value owned by
//! the caller, so a run's statistics never leak into another run.

pub mod gate;
pub mod noise;
pub mod scoring;

pub use crate::analyze::gate::passes_gate;
pub use crate::analyze::noise::{first_ignore_hit, NoiseCounts};
pub use crate::analyze::scoring::{raw_score, score_text, DEFAULT_MAX_SCORE};

use crate::keywords::KeywordTable;

/// Outcome for a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Matched an ignore term; never scored.
    Noise(String),
    /// No domain term.
    GatedOut,
    /// Relevant but nothing in the lexicon matched.
    ZeroScore,
    /// Relevant, score in `1..=cap`.
    Scored(u32),
}

/// Counters for the filtering pass of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub noise: NoiseCounts,
    pub gated_out: usize,
    pub zero_score: usize,
}

/// Classify `text` (title + summary) and update `stats`.
pub fn classify(text: &str, table: &KeywordTable, cap: u32, stats: &mut FilterStats) -> Verdict {
    let lower = text.to_lowercase();

    if let Some(term) = first_ignore_hit(&lower, table) {
        stats.noise.record(term);
        return Verdict::Noise(term.to_string());
    }

    if !passes_gate(&lower, table) {
        stats.gated_out += 1;
        return Verdict::GatedOut;
    }

    match score_text(&lower, table, cap) {
        0 => {
            stats.zero_score += 1;
            Verdict::ZeroScore
        }
        s => Verdict::Scored(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_wins_over_relevance() {
        let mut st = FilterStats::default();
        let v = classify("NFL star reacts to War news", KeywordTable::builtin(), 6, &mut st);
        assert_eq!(v, Verdict::Noise("NFL".into()));
        assert_eq!(st.noise.get("NFL"), 1);
        assert_eq!(st.gated_out, 0);
    }

    #[test]
    fn irrelevant_entries_are_gated() {
        let mut st = FilterStats::default();
        let v = classify("Senator unveils healthcare plan", KeywordTable::builtin(), 6, &mut st);
        assert_eq!(v, Verdict::GatedOut);
        assert_eq!(st.gated_out, 1);
    }

    #[test]
    fn relevant_without_lexicon_hit_scores_zero() {
        // "Lithium" is a domain term but carries no weight
        let mut st = FilterStats::default();
        let v = classify("Lithium prices slide", KeywordTable::builtin(), 6, &mut st);
        assert_eq!(v, Verdict::ZeroScore);
        assert_eq!(st.zero_score, 1);
    }

    #[test]
    fn scored_entries_respect_the_cap() {
        let mut st = FilterStats::default();
        let t = KeywordTable::builtin();
        assert_eq!(classify("Missile strike near pipeline", t, 6, &mut st), Verdict::Scored(6));
        assert_eq!(classify("Treasury auction", t, 6, &mut st), Verdict::Scored(2));
        assert_eq!(classify("Missile strike near pipeline", t, 3, &mut st), Verdict::Scored(3));
        assert_eq!(st, FilterStats::default());
    }
}
