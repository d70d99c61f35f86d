// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::normalize_text;
use crate::ingest::types::{FeedEntry, FeedSource};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

/// RSS 2.0 feed, either fetched over HTTP or parsed from an in-memory document.
pub struct RssFeedProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedProvider {
    pub fn from_fixture_str(name: impl Into<String>, xml: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(
        name: impl Into<String>,
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    /// Shared client for all feeds of a run.
    pub fn http_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("macro-intel/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<FeedEntry>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml for {}", self.name))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            // link is the dedup key; an entry without one cannot be tracked
            let link = match it.link.as_deref().map(str::trim) {
                Some(l) if !l.is_empty() => l.to_string(),
                _ => continue,
            };
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let summary = normalize_text(it.description.as_deref().unwrap_or_default());
            out.push(FeedEntry {
                title,
                summary,
                link,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("scan_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for RssFeedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<FeedEntry>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = match client.get(url.as_str()).send().await {
                    Ok(resp) => resp
                        .error_for_status()
                        .with_context(|| format!("{} http status", self.name))?
                        .text()
                        .await
                        .with_context(|| format!("{} http .text()", self.name))?,
                    Err(e) => {
                        counter!("scan_http_errors_total").increment(1);
                        return Err(e).with_context(|| format!("{} http get({url})", self.name));
                    }
                };
                self.parse_items_from_str(&body)
            }
        }
    }
}

/// HTML entities that are not defined in XML and would break the parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <title>OPEC&nbsp;weighs output cut</title>
      <link>https://example.test/a</link>
      <description><![CDATA[<p>Oil <b>jumps</b> on supply fears.</p>]]></description>
    </item>
    <item>
      <title>No link here</title>
    </item>
    <item>
      <title>Treasury yields climb</title>
      <link> https://example.test/b </link>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn parses_items_and_skips_linkless() {
        let p = RssFeedProvider::from_fixture_str("ENERGY (Test)", XML);
        let items = p.fetch().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "OPEC weighs output cut");
        assert_eq!(items[0].summary, "Oil jumps on supply fears.");
        assert_eq!(items[1].link, "https://example.test/b");
        assert_eq!(items[1].summary, "");
    }

    #[tokio::test]
    async fn empty_channel_yields_no_items() {
        let xml = r#"<rss version="2.0"><channel><title>Empty</title></channel></rss>"#;
        let p = RssFeedProvider::from_fixture_str("MACRO (Empty)", xml);
        assert!(p.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn garbage_is_an_error() {
        let p = RssFeedProvider::from_fixture_str("MACRO (Bad)", "not xml at all");
        assert!(p.fetch().await.is_err());
    }
}
