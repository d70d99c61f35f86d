//! Terminal dashboard printed at the end of a scan run.

use std::fmt::Write as _;
use std::path::Path;

use crate::aggregate::DailyAggregate;
use crate::ingest::ScanOutcome;
use crate::narrative::driver_label;

/// One bar block per this many points (integer truncation).
pub const POINTS_PER_BLOCK: u32 = 5;

/// `"█"` repeated `score / 5` times.
pub fn stress_bar(score: u32) -> String {
    "█".repeat((score / POINTS_PER_BLOCK) as usize)
}

pub fn render_dashboard(agg: &DailyAggregate, scan: &ScanOutcome, brief_path: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "========================================");
    let _ = writeln!(out, "   DAILY MACRO STRESS INDEX: {}", agg.daily_score);
    let _ = writeln!(out, "   (Dominant Driver: {})", driver_label(agg.dominant));
    let _ = writeln!(out, "----------------------------------------");
    let _ = writeln!(out, "   STRESS COMPOSITION:");
    for (bucket, score) in agg.scores.iter().filter(|(_, s)| *s > 0) {
        let _ = writeln!(out, "   {}: {} {}", bucket, score, stress_bar(score));
    }
    let _ = writeln!(out, "----------------------------------------");
    let _ = writeln!(
        out,
        "   NEW HITS: {} | NOISE FILTERED: {}",
        scan.new_records.len(),
        scan.filter.noise.total()
    );
    let _ = writeln!(out, "[+] WRITTEN BRIEF GENERATED: {}", brief_path.display());
    let _ = writeln!(out, "========================================");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Bucket, BucketScores};
    use chrono::NaiveDate;

    #[test]
    fn bar_length_truncates() {
        assert_eq!(stress_bar(4), "");
        assert_eq!(stress_bar(5), "█");
        assert_eq!(stress_bar(14).chars().count(), 2);
    }

    #[test]
    fn only_non_zero_buckets_are_drawn() {
        let scores: BucketScores = [(Bucket::Plumbing, 12), (Bucket::Macro, 3)]
            .into_iter()
            .collect();
        let agg = DailyAggregate {
            day: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            daily_score: 15,
            record_count: 3,
            dominant: scores.dominant(),
            scores,
            top: Vec::new(),
        };
        let mut scan = ScanOutcome::default();
        scan.filter.noise.record("NBA");
        let text = render_dashboard(&agg, &scan, Path::new("brief.txt"));
        assert!(text.contains("DAILY MACRO STRESS INDEX: 15"));
        assert!(text.contains("(Dominant Driver: PLUMBING)"));
        assert!(text.contains("   PLUMBING: 12 ██\n"));
        assert!(text.contains("   MACRO: 3 \n"));
        assert!(!text.contains("CONFLICT:"));
        assert!(text.contains("NEW HITS: 0 | NOISE FILTERED: 1"));
    }
}
