// src/keywords.rs
//! Keyword tables: domain terms (relevance gate), ignore terms (noise filter),
//! the weighted scoring lexicon, and the theme buckets used by the daily
//! aggregation.
//!
//! Tables are loaded once at startup and never mutated afterwards. Every list
//! keeps the order it has in the TOML file; that order is the evaluation order.
//! All matching is a case-insensitive substring test, so each term is stored
//! together with its lowercased form.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::Bucket;

pub const DEFAULT_KEYWORDS_PATH: &str = "config/keywords.toml";
pub const ENV_KEYWORDS_PATH: &str = "MACRO_INTEL_KEYWORDS_PATH";

static BUILTIN: Lazy<KeywordTable> = Lazy::new(|| {
    KeywordTable::from_toml_str(include_str!("../config/keywords.toml"))
        .expect("valid built-in keyword tables")
});

/// A table term with its precomputed lowercase form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    lower: String,
}

impl Term {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lower = text.to_lowercase();
        Self { text, lower }
    }

    /// `haystack_lower` must already be lowercased.
    #[inline]
    pub fn found_in(&self, haystack_lower: &str) -> bool {
        haystack_lower.contains(self.lower.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedTerm {
    pub term: Term,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKeywords {
    pub bucket: Bucket,
    pub keywords: Vec<Term>,
}

/* ----------------------------
File schema (TOML)
---------------------------- */

#[derive(Debug, Deserialize)]
struct KeywordsFile {
    #[serde(default)]
    domain_terms: Vec<String>,
    #[serde(default)]
    ignore_terms: Vec<String>,
    #[serde(default)]
    weights: Vec<WeightCfg>,
    #[serde(default)]
    buckets: Vec<BucketCfg>,
    #[serde(default)]
    source_fallback: HashMap<String, Bucket>,
}

#[derive(Debug, Deserialize)]
struct WeightCfg {
    term: String,
    weight: u32,
}

#[derive(Debug, Deserialize)]
struct BucketCfg {
    name: Bucket,
    keywords: Vec<String>,
}

/// Immutable keyword tables shared by the filters, the scorer and the aggregator.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    domain: Vec<Term>,
    ignore: Vec<Term>,
    weighted: Vec<WeightedTerm>,
    buckets: Vec<BucketKeywords>,
    source_fallback: HashMap<String, Bucket>,
}

impl KeywordTable {
    /// Tables compiled into the binary (`config/keywords.toml` at build time).
    pub fn builtin() -> &'static KeywordTable {
        &BUILTIN
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let file: KeywordsFile = toml::from_str(toml_str).context("parsing keyword tables")?;

        let mut seen_buckets = HashSet::new();
        let mut buckets = Vec::with_capacity(file.buckets.len());
        for b in file.buckets {
            if !seen_buckets.insert(b.name) {
                return Err(anyhow!("bucket `{}` listed twice", b.name));
            }
            buckets.push(BucketKeywords {
                bucket: b.name,
                keywords: clean_terms(b.keywords),
            });
        }

        let mut seen_weights = HashSet::new();
        let mut weighted = Vec::with_capacity(file.weights.len());
        for w in file.weights {
            let t = w.term.trim();
            if t.is_empty() || !seen_weights.insert(t.to_lowercase()) {
                continue;
            }
            weighted.push(WeightedTerm {
                term: Term::new(t),
                weight: w.weight,
            });
        }

        let source_fallback = file
            .source_fallback
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v))
            .collect();

        Ok(Self {
            domain: clean_terms(file.domain_terms),
            ignore: clean_terms(file.ignore_terms),
            weighted,
            buckets,
            source_fallback,
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading keyword tables from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid keyword tables in {}", path.display()))
    }

    /// Resolution order:
    /// 1) $MACRO_INTEL_KEYWORDS_PATH (must exist)
    /// 2) config/keywords.toml
    /// 3) built-in tables
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_KEYWORDS_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_KEYWORDS_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let p = PathBuf::from(DEFAULT_KEYWORDS_PATH);
        if p.exists() {
            return Self::load_from(&p);
        }
        Ok(Self::builtin().clone())
    }

    pub fn domain_terms(&self) -> &[Term] {
        &self.domain
    }

    pub fn ignore_terms(&self) -> &[Term] {
        &self.ignore
    }

    pub fn weighted_terms(&self) -> &[WeightedTerm] {
        &self.weighted
    }

    /// Theme buckets in priority order.
    pub fn buckets(&self) -> &[BucketKeywords] {
        &self.buckets
    }

    /// Fallback bucket for a source category; `OTHER` when the category is unknown.
    pub fn fallback_bucket(&self, category: &str) -> Bucket {
        self.source_fallback
            .get(category)
            .copied()
            .unwrap_or(Bucket::Other)
    }
}

/// Trim, drop empties and case-insensitive duplicates; first occurrence wins.
fn clean_terms(items: Vec<String>) -> Vec<Term> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if t.is_empty() || !seen.insert(t.to_lowercase()) {
            continue;
        }
        out.push(Term::new(t));
    }
    out
}
