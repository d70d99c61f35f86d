//! # Net Liquidity
//! Pulls three FRED series and derives
//! `Net Liquidity = Fed assets − Treasury General Account − reverse repo`, in billions.
//!
//! | series      | meaning                 | FRED unit |
//! |-------------|-------------------------|-----------|
//! | `WALCL`     | Fed total assets        | millions  |
//! | `WTREGEN`   | Treasury General Acct.  | millions  |
//! | `RRPONTSYD` | overnight reverse repo  | billions  |
//!
//! The series report on different days. They are outer-joined on date,
//! clipped to the start date, forward-filled per column, and rows that are
//! still incomplete are dropped.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

pub const FRED_OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
pub const ENV_FRED_API_KEY: &str = "FRED_API_KEY";
pub const ENV_LIQUIDITY_START: &str = "LIQUIDITY_START";
pub const DEFAULT_START: &str = "2023-01-01";

pub const SERIES_ASSETS: &str = "WALCL";
pub const SERIES_TGA: &str = "WTREGEN";
pub const SERIES_RRP: &str = "RRPONTSYD";

/// Single observation; `None` where FRED reports `"."`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

/// Parse a FRED `series/observations` JSON body. Entries with an unreadable
/// date are dropped.
pub fn parse_observations(body: &str) -> Result<Vec<Observation>> {
    let resp: ObservationsResponse =
        serde_json::from_str(body).context("parsing FRED observations json")?;
    Ok(resp
        .observations
        .into_iter()
        .filter_map(|o| {
            let date = NaiveDate::parse_from_str(o.date.trim(), "%Y-%m-%d").ok()?;
            let value = o.value.trim().parse::<f64>().ok().filter(|v| v.is_finite());
            Some(Observation { date, value })
        })
        .collect())
}

/// Minimal FRED client.
pub struct FredClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.into(),
            base_url: FRED_OBSERVATIONS_URL.to_string(),
            client,
        }
    }

    /// Key from `FRED_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(ENV_FRED_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing {ENV_FRED_API_KEY} env var"))?;
        Ok(Self::new(key.trim()))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let start = start.format("%Y-%m-%d").to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("FRED request for {series_id}"))?;

        if !response.status().is_success() {
            anyhow::bail!("FRED request for {series_id} failed: {}", response.status());
        }
        let body = response.text().await.context("FRED .text()")?;
        let obs = parse_observations(&body)?;
        tracing::info!(
            target: "liquidity",
            series = series_id,
            observations = obs.len(),
            "series fetched"
        );
        Ok(obs)
    }
}

/// One aligned day, all values in billions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidityRow {
    pub date: NaiveDate,
    pub fed_assets: f64,
    pub reverse_repo: f64,
    pub tga: f64,
    pub net_liquidity: f64,
}

/// Join, clip, forward-fill, convert units and derive net liquidity.
/// `assets` and `tga` are in millions, `rrp` in billions.
pub fn build_frame(
    assets: &[Observation],
    rrp: &[Observation],
    tga: &[Observation],
    start: NaiveDate,
) -> Vec<LiquidityRow> {
    const ASSETS: usize = 0;
    const RRP: usize = 1;
    const TGA: usize = 2;

    let mut joined: BTreeMap<NaiveDate, [Option<f64>; 3]> = BTreeMap::new();
    for (col, series) in [(ASSETS, assets), (RRP, rrp), (TGA, tga)] {
        for o in series {
            let slot = joined.entry(o.date).or_insert([None; 3]);
            if o.value.is_some() {
                slot[col] = o.value;
            }
        }
    }

    let mut last: [Option<f64>; 3] = [None; 3];
    let mut out = Vec::new();
    for (date, vals) in joined.range(start..) {
        for (slot, v) in last.iter_mut().zip(vals) {
            if v.is_some() {
                *slot = *v;
            }
        }
        let (Some(a), Some(r), Some(t)) = (last[ASSETS], last[RRP], last[TGA]) else {
            continue;
        };
        let fed_assets = a / 1000.0;
        let tga = t / 1000.0;
        out.push(LiquidityRow {
            date: *date,
            fed_assets,
            reverse_repo: r,
            tga,
            net_liquidity: fed_assets - tga - r,
        });
    }
    out
}

/// Fetch all three series and build the frame.
pub async fn fetch_liquidity(client: &FredClient, start: NaiveDate) -> Result<Vec<LiquidityRow>> {
    let assets = client.fetch_series(SERIES_ASSETS, start).await?;
    let rrp = client.fetch_series(SERIES_RRP, start).await?;
    let tga = client.fetch_series(SERIES_TGA, start).await?;
    Ok(build_frame(&assets, &rrp, &tga, start))
}

/// Start date from `LIQUIDITY_START`, else 2023-01-01.
pub fn start_from_env() -> NaiveDate {
    std::env::var(ENV_LIQUIDITY_START)
        .ok()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        .unwrap_or_else(default_start)
}

fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Last `n` rows as a fixed-width table.
pub fn render_tail(rows: &[LiquidityRow], n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12}{:>14}{:>14}{:>12}{:>16}",
        "Date", "Fed_Assets", "Reverse_Repo", "TGA", "Net_Liquidity"
    );
    let start = rows.len().saturating_sub(n);
    for r in &rows[start..] {
        let _ = writeln!(
            out,
            "{:<12}{:>14.3}{:>14.3}{:>12.3}{:>16.3}",
            r.date.format("%Y-%m-%d").to_string(),
            r.fed_assets,
            r.reverse_repo,
            r.tga,
            r.net_liquidity
        );
    }
    out
}
