// src/aggregate.rs
//! # Daily Aggregator
//! Re-reads the day's persisted records and attributes each record's full
//! score to exactly one theme bucket, so bucket totals always sum to the
//! daily stress index.
//!
//! Attribution: first bucket (in table order) with a keyword found in the
//! headline; otherwise the source category's fallback bucket (`OTHER` when the
//! category is unknown). Pure, no I/O.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;

use crate::keywords::KeywordTable;
use crate::record::HeadlineRecord;

/// How many records make the "critical intel" list.
pub const TOP_N: usize = 5;

/// Theme bucket. Declaration order is the fixed iteration order used for
/// reproducible tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bucket {
    Plumbing,
    Conflict,
    Macro,
    Other,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Plumbing,
        Bucket::Conflict,
        Bucket::Macro,
        Bucket::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Plumbing => "PLUMBING",
            Bucket::Conflict => "CONFLICT",
            Bucket::Macro => "MACRO",
            Bucket::Other => "OTHER",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated score per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketScores([u32; 4]);

impl BucketScores {
    pub fn get(&self, b: Bucket) -> u32 {
        self.0[b.index()]
    }

    /// Saturates at `u32::MAX`.
    pub fn add(&mut self, b: Bucket, score: u32) {
        let slot = &mut self.0[b.index()];
        *slot = slot.saturating_add(score);
    }

    pub fn total(&self) -> u32 {
        self.0.iter().fold(0u32, |acc, s| acc.saturating_add(*s))
    }

    /// `(bucket, score)` in the fixed `Bucket::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, u32)> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b, self.get(b)))
    }

    /// Bucket with the highest score; the first one in `Bucket::ALL` order wins a tie.
    /// `None` when every bucket is zero.
    pub fn dominant(&self) -> Option<Bucket> {
        let mut best: Option<(Bucket, u32)> = None;
        for (b, s) in self.iter() {
            if s > 0 && best.map_or(true, |(_, top)| s > top) {
                best = Some((b, s));
            }
        }
        best.map(|(b, _)| b)
    }
}

impl FromIterator<(Bucket, u32)> for BucketScores {
    fn from_iter<I: IntoIterator<Item = (Bucket, u32)>>(iter: I) -> Self {
        let mut out = Self::default();
        for (b, s) in iter {
            out.add(b, s);
        }
        out
    }
}

/// Bucket a headline belongs to.
pub fn bucket_for(headline: &str, category: &str, table: &KeywordTable) -> Bucket {
    let lower = headline.to_lowercase();
    table
        .buckets()
        .iter()
        .find(|b| b.keywords.iter().any(|k| k.found_in(&lower)))
        .map(|b| b.bucket)
        .unwrap_or_else(|| table.fallback_bucket(category))
}

/// One day's aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub day: NaiveDate,
    pub scores: BucketScores,
    pub daily_score: u32,
    pub record_count: usize,
    /// `None` when the day has no signal.
    pub dominant: Option<Bucket>,
    /// Up to `TOP_N` records, highest score first; equal scores keep log order.
    pub top: Vec<HeadlineRecord>,
}

impl DailyAggregate {
    /// Aggregate the records stamped on `day`; records from other days are ignored.
    pub fn build(day: NaiveDate, records: &[HeadlineRecord], table: &KeywordTable) -> Self {
        let todays: Vec<&HeadlineRecord> = records.iter().filter(|r| r.is_on_day(day)).collect();

        let mut scores = BucketScores::default();
        let mut daily_score = 0u32;
        for r in &todays {
            daily_score = daily_score.saturating_add(r.score);
            scores.add(bucket_for(&r.headline, &r.category, table), r.score);
        }

        let dominant = if daily_score > 0 {
            scores.dominant()
        } else {
            None
        };

        let mut ranked = todays.clone();
        // sort_by is stable: equal scores stay in encounter order
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        let top = ranked.into_iter().take(TOP_N).cloned().collect();

        tracing::debug!(
            target: "aggregate",
            %day,
            records = todays.len(),
            daily_score,
            dominant = ?dominant,
            "daily aggregation"
        );

        Self {
            day,
            scores,
            daily_score,
            record_count: todays.len(),
            dominant,
            top,
        }
    }

    /// Score of the dominant bucket (0 without signal).
    pub fn dominant_score(&self) -> u32 {
        self.dominant.map(|b| self.scores.get(b)).unwrap_or(0)
    }

    /// Dominant bucket's share of the daily score, rounded to whole percent.
    pub fn dominant_share_pct(&self) -> u32 {
        share_pct(self.dominant_score(), self.daily_score)
    }
}

/// `round(part / total * 100)`, 0 when `total` is 0.
pub fn share_pct(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(total) * 100.0).round() as u32
}
