//! store.rs — append-only intel log (CSV) and the per-run set of seen links.
//!
//! The log is opened, written and closed per operation; nothing holds the file
//! between calls. Uniqueness of links is not enforced here: callers check
//! `SeenLinks::contains` before `IntelLog::append`.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::record::{HeadlineRecord, LOG_HEADER};

/// Column of the link in a log row.
const LINK_COLUMN: usize = 4;

/// Links already present in the log. Grows during a run, never shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenLinks(HashSet<String>);

impl SeenLinks {
    pub fn contains(&self, link: &str) -> bool {
        self.0.contains(link)
    }

    /// Returns `true` if the link was not known yet.
    pub fn insert(&mut self, link: impl Into<String>) -> bool {
        self.0.insert(link.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for SeenLinks {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Counters from one pass over the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows read (header excluded).
    pub rows: usize,
    /// Rows skipped as unreadable or incomplete.
    pub malformed: usize,
}

/// The persisted intel log.
#[derive(Debug, Clone)]
pub struct IntelLog {
    path: PathBuf,
}

impl IntelLog {
    /// Open the log, creating it (with the header row) if it does not exist.
    /// Failure here means the persistence layer is unavailable.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating log directory {}", dir.display()))?;
            }
            let mut w = csv::Writer::from_path(&path)
                .with_context(|| format!("creating intel log {}", path.display()))?;
            w.write_record(LOG_HEADER)?;
            w.flush()?;
            tracing::info!(target: "store", path = %path.display(), "created new log file");
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn append(&self, record: &HeadlineRecord) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening intel log {} for append", self.path.display()))?;
        let needs_header = file.metadata().map(|m| m.len() == 0).unwrap_or(false);

        let mut w = csv::Writer::from_writer(file);
        if needs_header {
            w.write_record(LOG_HEADER)?;
        }
        w.write_record(record.to_row())
            .with_context(|| format!("appending to intel log {}", self.path.display()))?;
        w.flush()?;
        Ok(())
    }

    /// Every link in the log. Rows too short to carry a link are skipped.
    pub fn load_seen_links(&self) -> Result<(SeenLinks, LoadStats)> {
        let mut stats = LoadStats::default();
        let mut links = Vec::new();
        self.for_each_row(&mut stats, |row| match row.get(LINK_COLUMN) {
            Some(link) => {
                links.push(link.to_string());
                true
            }
            None => false,
        })?;
        tracing::info!(
            target: "store",
            links = links.len(),
            malformed = stats.malformed,
            "loaded seen links"
        );
        Ok((links.into_iter().collect(), stats))
    }

    /// Every well-formed record in the log, in file order.
    pub fn read_records(&self) -> Result<(Vec<HeadlineRecord>, LoadStats)> {
        let mut stats = LoadStats::default();
        let mut out = Vec::new();
        self.for_each_row(&mut stats, |row| match HeadlineRecord::from_row(row) {
            Some(r) => {
                out.push(r);
                true
            }
            None => false,
        })?;
        Ok((out, stats))
    }

    /// Feed data rows to `f`; `f` returns `false` for a row it could not use.
    /// Unparseable rows are skipped; only I/O failures abort.
    fn for_each_row<F>(&self, stats: &mut LoadStats, mut f: F) -> Result<()>
    where
        F: FnMut(&csv::StringRecord) -> bool,
    {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("opening intel log {}", self.path.display()))?;

        for result in rdr.records() {
            stats.rows += 1;
            match result {
                Ok(row) => {
                    if !f(&row) {
                        stats.malformed += 1;
                    }
                }
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(e)
                        .with_context(|| format!("reading intel log {}", self.path.display()));
                }
                Err(e) => {
                    stats.malformed += 1;
                    tracing::debug!(target: "store", error = %e, "skipping malformed row");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn open_creates_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.csv");
        IntelLog::open(&path).unwrap();
        IntelLog::open(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Timestamp,Source,Category,Headline,Link,Score\n");
    }

    #[test]
    fn appended_links_are_visible_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let log = IntelLog::open(dir.path().join("log.csv")).unwrap();
        let headline = "Fed, \"hawkish\", holds";
        let r = HeadlineRecord::new(now(), "MACRO (CNBC)", headline, "https://x/1", 4);
        log.append(&r).unwrap();

        let (seen, stats) = log.load_seen_links().unwrap();
        assert!(seen.contains("https://x/1"));
        assert_eq!(stats, LoadStats { rows: 1, malformed: 0 });

        let (records, _) = log.read_records().unwrap();
        assert_eq!(records, vec![r]);
    }

    #[test]
    fn short_and_bad_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(
            &path,
            "Timestamp,Source,Category,Headline,Link,Score\n\
             2025-03-14 08:00,MACRO (CNBC),MACRO,Fed holds,https://x/1,4\n\
             2025-03-14 08:05,broken\n\
             2025-03-14 08:10,MACRO (CNBC),MACRO,Only link,https://x/2\n\
             2025-03-14 08:15,MACRO (CNBC),MACRO,Bad score,https://x/3,high\n",
        )
        .unwrap();
        let log = IntelLog::open(&path).unwrap();

        let (seen, stats) = log.load_seen_links().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(stats.malformed, 1);

        let (records, stats) = log.read_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(stats, LoadStats { rows: 4, malformed: 3 });
    }

    #[test]
    fn corrupt_scores_do_not_break_aggregation() {
        use crate::aggregate::DailyAggregate;
        use crate::keywords::KeywordTable;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(
            &path,
            "Timestamp,Source,Category,Headline,Link,Score\n\
             2025-03-14 08:00,MACRO (CNBC),MACRO,Fed holds,https://x/1,3000000000\n\
             2025-03-14 08:05,MACRO (CNBC),MACRO,Fed cuts,https://x/2,3000000000\n\
             2025-03-14 08:10,MACRO (CNBC),MACRO,Fed waits,https://x/3,0\n",
        )
        .unwrap();
        let log = IntelLog::open(&path).unwrap();

        let (records, stats) = log.read_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(stats, LoadStats { rows: 3, malformed: 1 });

        let agg = DailyAggregate::build(now().date(), &records, KeywordTable::builtin());
        assert_eq!(agg.daily_score, u32::MAX);
        assert_eq!(agg.scores.total(), agg.daily_score);
    }

    #[test]
    fn append_restores_header_on_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let log = IntelLog::open(&path).unwrap();
        fs::write(&path, "").unwrap();
        log.append(&HeadlineRecord::new(now(), "ENERGY (X)", "Oil", "https://x/9", 1))
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Timestamp,Source"));
        assert_eq!(log.read_records().unwrap().0.len(), 1);
    }
}
