// Shared test doubles for the integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use macro_intel::{FeedEntry, FeedSource};

pub struct MockSource {
    pub name: String,
    pub entries: Vec<FeedEntry>,
}

impl MockSource {
    pub fn boxed(name: &str, entries: Vec<FeedEntry>) -> Box<dyn FeedSource> {
        Box::new(Self {
            name: name.to_string(),
            entries,
        })
    }
}

#[async_trait]
impl FeedSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }
    async fn fetch(&self) -> Result<Vec<FeedEntry>> {
        Ok(self.entries.clone())
    }
}

pub struct FailingSource;

#[async_trait]
impl FeedSource for FailingSource {
    fn name(&self) -> &str {
        "MACRO (Down)"
    }
    async fn fetch(&self) -> Result<Vec<FeedEntry>> {
        Err(anyhow!("connection refused"))
    }
}

pub fn entry(title: &str, summary: &str, link: &str) -> FeedEntry {
    FeedEntry::new(title, summary, link)
}

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}
