//! Noise filter: rejects entries that mention any ignore term.

use crate::keywords::KeywordTable;

/// First ignore term (in table order) found in `text_lower`.
/// The returned term is the one credited in the noise statistics.
pub fn first_ignore_hit<'t>(text_lower: &str, table: &'t KeywordTable) -> Option<&'t str> {
    table
        .ignore_terms()
        .iter()
        .find(|t| t.found_in(text_lower))
        .map(|t| t.text.as_str())
}

/// Per-term rejection counts. Keeps first-hit order so that equal counts
/// rank deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoiseCounts {
    counts: Vec<(String, usize)>,
}

impl NoiseCounts {
    pub fn record(&mut self, term: &str) {
        match self.counts.iter_mut().find(|(t, _)| t == term) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((term.to_string(), 1)),
        }
    }

    pub fn get(&self, term: &str) -> usize {
        self.counts
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent terms; ties keep first-hit order.
    pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
        let mut v: Vec<(&str, usize)> = self.counts.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v.truncate(n);
        v
    }

    /// `"NFL (3), Netflix (1)"`, or `"None"` when nothing was filtered.
    pub fn summary(&self, n: usize) -> String {
        let top = self.most_common(n);
        if top.is_empty() {
            return "None".to_string();
        }
        top.iter()
            .map(|(t, c)| format!("{t} ({c})"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
