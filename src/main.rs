//! Macro intel scan — binary entrypoint.
//! Scans the configured feeds once, appends new scored headlines to the intel
//! log, then writes the daily brief and prints the terminal dashboard.

use anyhow::{Context, Result};
use chrono::Local;

use macro_intel::dashboard::render_dashboard;
use macro_intel::ingest::config::load_feeds_default;
use macro_intel::ingest::providers::rss::RssFeedProvider;
use macro_intel::{
    render_brief, run_scan_with, write_brief, DailyAggregate, FeedSource, IntelLog, KeywordTable,
    ScanEvent, Settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    macro_intel::settings::init_tracing();

    let settings = Settings::from_env();
    let table = KeywordTable::load_default().context("loading keyword tables")?;
    let feeds = load_feeds_default().context("loading feed list")?;

    // The log is the only hard dependency: no log, no run.
    let log = IntelLog::open(&settings.log_path)?;
    let (mut seen, load_stats) = log.load_seen_links()?;
    if load_stats.malformed > 0 {
        tracing::warn!(malformed = load_stats.malformed, "skipped malformed log rows");
    }

    let now = Local::now().naive_local();
    println!("--- MACRO INTELLIGENCE REPORT ---");
    println!("--- {} ---\n", now.format("%Y-%m-%d %H:%M"));

    let client = RssFeedProvider::http_client();
    let sources: Vec<Box<dyn FeedSource>> = feeds
        .into_iter()
        .map(|f| {
            let provider = RssFeedProvider::from_url(f.name, f.url, client.clone());
            Box::new(provider) as Box<dyn FeedSource>
        })
        .collect();

    let scan = run_scan_with(
        &sources,
        &table,
        &settings.scan,
        &log,
        &mut seen,
        now,
        |ev| match ev {
            ScanEvent::Source(name) => println!("Scanning {name}..."),
            ScanEvent::Empty(_) => println!("     [!] Error: No entries found."),
            ScanEvent::Failed(name, e) => println!("Error reading {name}: {e:#}"),
            ScanEvent::New(r) => println!(" [NEW][Score: {}] {}", r.score, r.headline),
            ScanEvent::SourceDone(_) => println!("{}", "-".repeat(40)),
        },
    )
    .await?;
    if scan.sources_failed > 0 {
        println!(
            "     [!] {} of {} sources failed or were empty",
            scan.sources_failed,
            sources.len()
        );
    }

    let (records, _) = log.read_records()?;
    let aggregate = DailyAggregate::build(now.date(), &records, &table);
    let brief = render_brief(&aggregate, &scan.filter);
    let brief_path =
        write_brief(&settings.brief_dir, &settings.brief_prefix, aggregate.day, &brief)?;

    print!("{}", render_dashboard(&aggregate, &scan, &brief_path));
    Ok(())
}
