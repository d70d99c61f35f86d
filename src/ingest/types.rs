// src/ingest/types.rs
use anyhow::Result;

/// One raw feed entry as delivered by a source.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub summary: String, // may be empty
    pub link: String,    // dedup key
}

impl FeedEntry {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            link: link.into(),
        }
    }

    /// Text the filters and the scorer look at.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// A named headline source (an RSS feed, a fixture, a test double).
#[async_trait::async_trait]
pub trait FeedSource {
    /// Display name, e.g. `"ENERGY (OilPrice)"`; its first word is the record category.
    fn name(&self) -> &str;
    async fn fetch(&self) -> Result<Vec<FeedEntry>>;
}
