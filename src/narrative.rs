//! # Narrative
//! Maps the day's dominant driver to one of four regimes and fills the fixed
//! brief templates. Pure lookup plus score interpolation; the only I/O is
//! `write_brief`, which overwrites the dated brief file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::{Bucket, DailyAggregate};
use crate::analyze::FilterStats;
use crate::record::DAY_FORMAT;

/// Default brief filename prefix.
pub const DEFAULT_BRIEF_PREFIX: &str = "Macro_Brief";
/// Ignore terms listed in the noise summary.
pub const NOISE_SUMMARY_TERMS: usize = 3;

const RULE: &str = "------------------------------------------------------------";

/// Market regime selected by the dominant driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Conflict,
    Plumbing,
    Macro,
    /// No signal, or the dominant bucket is `OTHER`.
    None,
}

impl Regime {
    pub fn from_driver(driver: Option<Bucket>) -> Self {
        match driver {
            Some(Bucket::Conflict) => Regime::Conflict,
            Some(Bucket::Plumbing) => Regime::Plumbing,
            Some(Bucket::Macro) => Regime::Macro,
            Some(Bucket::Other) | None => Regime::None,
        }
    }

    /// Situation analysis; `score` is the dominant bucket's score.
    pub fn analysis(self, score: u32) -> String {
        match self {
            Regime::Conflict => format!(
                "The Liquidity Monitor has detected a significant regime shift \
                 towards GEOPOLITICAL CONFLICT. With a Conflict Score of {score}, \
                 physical risks (War/Energy/Supply Chains) are overpowering standard \
                 macro inputs. Markets are likely pricing in supply shocks."
            ),
            Regime::Plumbing => format!(
                "CRITICAL WARNING: The system has detected elevated stress in \
                 FINANCIAL PLUMBING. A Plumbing Score of {score} indicates potential \
                 collateral shortages or banking risks. Systemic risk is elevated \
                 beyond normal variance."
            ),
            Regime::Macro => "The market is operating in a standard MACRO/POLICY regime. \
                 Stress is driven by Central Bank expectations, rates, and inflation data. \
                 Volatility is likely contained within normal ranges absent a policy shock."
                .to_string(),
            Regime::None => "Market signals are muted. No dominant stressor detected.".to_string(),
        }
    }

    pub fn action_plan(self) -> &'static str {
        match self {
            Regime::Conflict => {
                "1. ENERGY: Overweight Global Energy Producers and Integrated Oil.\n\
                 2. DEFENSE: Monitor Industrial Defense primes for expanding order books.\n\
                 3. HEDGE: Physical Commodities are the preferred hedge over sovereign bonds."
            }
            Regime::Plumbing => {
                "1. CASH: Prioritize Cash Equivalents and Short-Duration Treasuries (T-Bills).\n\
                 2. SOVEREIGN: Monitor Hard Assets as 'System Exit' liquidity proxies.\n\
                 3. RISK OFF: Reduce exposure to high-beta and credit-sensitive equities."
            }
            Regime::Macro => {
                "1. NEUTRAL: No emergency actions required. Maintain standard allocation.\n\
                 2. WATCH: 10Y Yields and Dollar Index (DXY) for directional cues.\n\
                 3. IGNORE: Intraday volatility unless accompanied by volume expansion."
            }
            Regime::None => "Maintain current positioning.",
        }
    }
}

/// Driver label as printed: the bucket name, or `NONE` without signal.
pub fn driver_label(driver: Option<Bucket>) -> &'static str {
    driver.map(Bucket::as_str).unwrap_or("NONE")
}

/// Full brief text. Deterministic for the same aggregate and stats.
pub fn render_brief(agg: &DailyAggregate, stats: &FilterStats) -> String {
    let regime = Regime::from_driver(agg.dominant);
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "CONFIDENTIAL // MARKET INTELLIGENCE BRIEF");
    let _ = writeln!(out, "DATE: {}", agg.day.format("%B %d, %Y"));
    let _ = writeln!(out, "SUBJECT: DAILY MACRO REGIME ANALYSIS");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "1. SITUATION ANALYSIS");
    let _ = writeln!(out, "---------------------");
    let _ = writeln!(out, "{}", regime.analysis(agg.dominant_score()));
    let _ = writeln!(out);
    let _ = writeln!(out, "The 'Daily Macro Stress Index' closed at {}.", agg.daily_score);
    let _ = writeln!(
        out,
        "Dominant Driver: >> {} << ({}% of Signal)",
        driver_label(agg.dominant),
        agg.dominant_share_pct()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "2. STRATEGIC POSTURE");
    let _ = writeln!(out, "--------------------");
    let _ = writeln!(out, "{}", regime.action_plan());
    let _ = writeln!(out);
    let _ = writeln!(out, "3. CRITICAL INTEL (Top 5 Signals)");
    let _ = writeln!(out, "---------------------------------");
    for (i, r) in agg.top.iter().enumerate() {
        let _ = writeln!(out, "{}. {} [Severity: {}]", i + 1, r.headline, r.score);
        let _ = writeln!(out, "   LINK: {}", r.link);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "4. SYSTEM DIAGNOSTICS");
    let _ = writeln!(out, "---------------------");
    let _ = writeln!(
        out,
        "Noise Artifacts Filtered: {} ({})",
        stats.noise.total(),
        stats.noise.summary(NOISE_SUMMARY_TERMS)
    );
    let _ = writeln!(out, "Political Fluff Gated: {}", stats.gated_out);
    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "END OF REPORT");
    out
}

/// `<prefix>_<YYYY-MM-DD>.txt`
pub fn brief_filename(prefix: &str, day: NaiveDate) -> String {
    format!("{}_{}.txt", prefix, day.format(DAY_FORMAT))
}

/// Write (or overwrite) the brief for `day` into `dir`.
pub fn write_brief(dir: &Path, prefix: &str, day: NaiveDate, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating brief directory {}", dir.display()))?;
    let path = dir.join(brief_filename(prefix, day));
    fs::write(&path, text).with_context(|| format!("writing brief {}", path.display()))?;
    Ok(path)
}
