// tests/metrics_scan.rs
// Scan counters reach an installed Prometheus recorder.

mod common;

use common::{at, entry, MockSource};
use macro_intel::{run_scan, FeedSource, IntelLog, KeywordTable, ScanConfig};
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::test]
async fn scan_counters_are_exported() {
    let handle = PrometheusBuilder::new().install_recorder().expect("recorder");

    let dir = tempfile::tempdir().unwrap();
    let log = IntelLog::open(dir.path().join("intel.csv")).unwrap();
    let (mut seen, _) = log.load_seen_links().unwrap();
    let sources: Vec<Box<dyn FeedSource>> = vec![MockSource::boxed(
        "MACRO (Wire)",
        vec![
            entry("Fed holds rates", "", "https://w/1"),
            entry("Netflix earnings beat", "", "https://w/2"),
        ],
    )];
    run_scan(&sources, KeywordTable::builtin(), &ScanConfig::default(), &log, &mut seen, at(14, 9))
        .await
        .unwrap();

    let out = handle.render();
    assert!(out.contains("scan_entries_total"));
    assert!(out.contains("scan_new_total"));
    assert!(out.contains("scan_noise_total"));
}
