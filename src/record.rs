//! record.rs — the persisted headline record and its row/timestamp formats.

use chrono::{NaiveDate, NaiveDateTime};

/// Log timestamp, minute precision (e.g. `2025-03-14 09:30`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Day prefix of `TIMESTAMP_FORMAT`, also embedded in the brief filename.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Header row of the persisted log.
pub const LOG_HEADER: [&str; 6] = ["Timestamp", "Source", "Category", "Headline", "Link", "Score"];

/// A scored headline as stored in the intel log. Immutable once written;
/// `link` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineRecord {
    pub timestamp: String,
    pub source_name: String,
    pub category: String,
    pub headline: String,
    pub link: String,
    /// Always in `1..=max_score` for a persisted record.
    pub score: u32,
}

impl HeadlineRecord {
    pub fn new(
        now: NaiveDateTime,
        source_name: impl Into<String>,
        headline: impl Into<String>,
        link: impl Into<String>,
        score: u32,
    ) -> Self {
        let source_name = source_name.into();
        Self {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            category: category_of(&source_name),
            source_name,
            headline: headline.into(),
            link: link.into(),
            score,
        }
    }

    /// Day match by timestamp prefix.
    pub fn is_on_day(&self, day: NaiveDate) -> bool {
        self.timestamp
            .starts_with(&day.format(DAY_FORMAT).to_string())
    }

    pub fn to_row(&self) -> [String; 6] {
        [
            self.timestamp.clone(),
            self.source_name.clone(),
            self.category.clone(),
            self.headline.clone(),
            self.link.clone(),
            self.score.to_string(),
        ]
    }

    /// Parse a log row. `None` for short rows or a score that is not a
    /// positive integer; zero-score records are never written.
    pub fn from_row(row: &csv::StringRecord) -> Option<Self> {
        if row.len() < LOG_HEADER.len() {
            return None;
        }
        let score = row.get(5)?.trim().parse::<u32>().ok().filter(|s| *s > 0)?;
        Some(Self {
            timestamp: row.get(0)?.to_string(),
            source_name: row.get(1)?.to_string(),
            category: row.get(2)?.to_string(),
            headline: row.get(3)?.to_string(),
            link: row.get(4)?.to_string(),
            score,
        })
    }
}

/// Category = first word of the source name (`"ENERGY (OilPrice)"` → `"ENERGY"`).
pub fn category_of(source_name: &str) -> String {
    source_name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_derives_category_and_timestamp() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 5, 59)
            .unwrap();
        let r =
            HeadlineRecord::new(now, "GEOPOLITICS (Defense News)", "Drone strike", "https://x", 4);
        assert_eq!(r.timestamp, "2025-03-14 09:05");
        assert_eq!(r.category, "GEOPOLITICS");
        assert!(r.is_on_day(now.date()));
        assert!(!r.is_on_day(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()));
    }

    #[test]
    fn from_row_rejects_short_rows_and_bad_scores() {
        let short = csv::StringRecord::from(vec!["2025-03-14 09:05", "A", "B", "C", "link"]);
        assert!(HeadlineRecord::from_row(&short).is_none());

        let bad = csv::StringRecord::from(vec!["2025-03-14 09:05", "A", "B", "C", "link", "six"]);
        assert!(HeadlineRecord::from_row(&bad).is_none());

        let zero = csv::StringRecord::from(vec!["2025-03-14 09:05", "A", "B", "C", "link", "0"]);
        assert!(HeadlineRecord::from_row(&zero).is_none());

        let ok = csv::StringRecord::from(vec!["2025-03-14 09:05", "A b", "A", "C", "link", "6"]);
        let r = HeadlineRecord::from_row(&ok).unwrap();
        assert_eq!(r.score, 6);
        assert_eq!(r.to_row()[4], "link");
    }

    #[test]
    fn category_of_empty_name_is_empty() {
        assert_eq!(category_of(""), "");
        assert_eq!(category_of("MACRO"), "MACRO");
    }
}
