// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use anyhow::Result;
use chrono::NaiveDateTime;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::analyze::{classify, FilterStats, Verdict, DEFAULT_MAX_SCORE};
use crate::ingest::types::FeedSource;
use crate::keywords::KeywordTable;
use crate::record::HeadlineRecord;
use crate::store::{IntelLog, SeenLinks};

/// Entries examined per feed when nothing else is configured.
pub const DEFAULT_MAX_ENTRIES: usize = 30;

/// One-time metrics registration (so series show up once a recorder is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scan_entries_total", "Feed entries examined.");
        describe_counter!("scan_noise_total", "Entries discarded by the noise filter.");
        describe_counter!("scan_gated_total", "Entries discarded by the relevance gate.");
        describe_counter!("scan_zero_score_total", "Relevant entries that scored zero.");
        describe_counter!("scan_duplicate_total", "Scored entries whose link was already logged.");
        describe_counter!("scan_new_total", "New records appended to the intel log.");
        describe_counter!("scan_source_errors_total", "Feed fetch/parse errors or empty feeds.");
        describe_counter!("scan_http_errors_total", "Feed HTTP requests that failed to connect.");
        describe_histogram!("scan_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, normalize quotes, collapse whitespace.
/// Length and punctuation are kept; the scorer sees the whole text.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    let out = re_tags.replace_all(&out, " ");

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Short anonymized id for debug logs; raw headlines are never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// MAX_SCORE_PER_ARTICLE.
    pub max_score: u32,
    /// Only the first `max_entries` entries of each feed are examined.
    pub max_entries: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_score: DEFAULT_MAX_SCORE,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Result of one scan pass over all sources.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Records appended during this run, in append order.
    pub new_records: Vec<HeadlineRecord>,
    pub filter: FilterStats,
    pub entries_seen: usize,
    pub duplicates: usize,
    pub sources_ok: usize,
    pub sources_failed: usize,
}

/// Progress reported while a scan runs, in scan order.
#[derive(Debug)]
pub enum ScanEvent<'a> {
    /// A source is about to be fetched.
    Source(&'a str),
    /// The source returned no entries.
    Empty(&'a str),
    /// The source could not be fetched or parsed.
    Failed(&'a str, &'a anyhow::Error),
    /// A record was appended to the log.
    New(&'a HeadlineRecord),
    /// The source is finished, whether or not it yielded entries.
    SourceDone(&'a str),
}

/// `run_scan_with` without progress reporting.
pub async fn run_scan(
    sources: &[Box<dyn FeedSource>],
    table: &KeywordTable,
    cfg: &ScanConfig,
    log: &IntelLog,
    seen: &mut SeenLinks,
    now: NaiveDateTime,
) -> Result<ScanOutcome> {
    run_scan_with(sources, table, cfg, log, seen, now, |_| {}).await
}

/// Scan every source once, in order: noise filter → relevance gate → scorer →
/// dedup by link → append to the log. `on_event` sees each step as it happens.
///
/// A failing or empty source is logged and skipped. A failing append is fatal:
/// the persistence layer is gone and the error is returned.
pub async fn run_scan_with<F>(
    sources: &[Box<dyn FeedSource>],
    table: &KeywordTable,
    cfg: &ScanConfig,
    log: &IntelLog,
    seen: &mut SeenLinks,
    now: NaiveDateTime,
    mut on_event: F,
) -> Result<ScanOutcome>
where
    F: FnMut(ScanEvent<'_>),
{
    ensure_metrics_described();

    let mut outcome = ScanOutcome::default();
    for source in sources {
        let name = source.name();
        tracing::info!(target: "ingest", source = name, "scanning");
        on_event(ScanEvent::Source(name));

        let entries = match source.fetch().await {
            Ok(v) if v.is_empty() => {
                tracing::warn!(target: "ingest", source = name, "no entries found");
                counter!("scan_source_errors_total").increment(1);
                outcome.sources_failed += 1;
                on_event(ScanEvent::Empty(name));
                on_event(ScanEvent::SourceDone(name));
                continue;
            }
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = name, "source error");
                counter!("scan_source_errors_total").increment(1);
                outcome.sources_failed += 1;
                on_event(ScanEvent::Failed(name, &e));
                on_event(ScanEvent::SourceDone(name));
                continue;
            }
        };
        outcome.sources_ok += 1;

        for entry in entries.into_iter().take(cfg.max_entries) {
            outcome.entries_seen += 1;
            counter!("scan_entries_total").increment(1);

            let text = entry.full_text();
            let score = match classify(&text, table, cfg.max_score, &mut outcome.filter) {
                Verdict::Scored(s) => s,
                Verdict::Noise(term) => {
                    counter!("scan_noise_total").increment(1);
                    tracing::debug!(
                        target: "ingest",
                        id = %anon_hash(&entry.title),
                        %term,
                        "noise"
                    );
                    continue;
                }
                Verdict::GatedOut => {
                    counter!("scan_gated_total").increment(1);
                    continue;
                }
                Verdict::ZeroScore => {
                    counter!("scan_zero_score_total").increment(1);
                    continue;
                }
            };

            if seen.contains(&entry.link) {
                outcome.duplicates += 1;
                counter!("scan_duplicate_total").increment(1);
                continue;
            }

            let record = HeadlineRecord::new(now, name, entry.title, entry.link, score);
            log.append(&record)?;
            seen.insert(record.link.clone());
            counter!("scan_new_total").increment(1);
            tracing::debug!(
                target: "ingest",
                id = %anon_hash(&record.headline),
                score,
                source = name,
                "new record"
            );
            on_event(ScanEvent::New(&record));
            outcome.new_records.push(record);
        }
        on_event(ScanEvent::SourceDone(name));
    }

    tracing::info!(
        target: "ingest",
        new = outcome.new_records.len(),
        noise = outcome.filter.noise.total(),
        gated = outcome.filter.gated_out,
        duplicates = outcome.duplicates,
        sources_failed = outcome.sources_failed,
        "scan finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_collapses_ws_and_keeps_punct() {
        let s = "  Hello,&nbsp;&nbsp; world!!!  ";
        assert_eq!(normalize_text(s), "Hello, world!!!");
        assert_eq!(normalize_text("Will the Fed cut again?"), "Will the Fed cut again?");
        assert_eq!(normalize_text("\u{201C}Hawkish\u{201D} hold."), "\"Hawkish\" hold.");
    }

    #[test]
    fn normalize_text_keeps_long_text_whole() {
        let long = format!("{} Repo Crisis", "filler ".repeat(300));
        let out = normalize_text(&long);
        assert!(out.chars().count() > 1500);
        assert!(out.ends_with("Repo Crisis"));
    }

    #[test]
    fn normalize_text_strips_tags_between_words() {
        assert_eq!(normalize_text("<p>Oil</p><p>jumps</p>"), "Oil jumps");
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("Fed hikes");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("Fed hikes"));
        assert_ne!(a, anon_hash("Fed holds"));
    }

    #[test]
    fn full_text_joins_title_and_summary() {
        let e = types::FeedEntry::new("Title", "Body", "https://x");
        assert_eq!(e.full_text(), "Title Body");
    }
}
