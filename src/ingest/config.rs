// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_FEEDS_PATH: &str = "MACRO_INTEL_FEEDS_PATH";

static BUILTIN_FEEDS: Lazy<Vec<FeedConfig>> = Lazy::new(|| {
    parse_toml(include_str!("../../config/feeds.toml")).expect("valid built-in feed list")
});

/// A feed to scan: display name + RSS URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

/// Feeds compiled into the binary.
pub fn builtin_feeds() -> Vec<FeedConfig> {
    BUILTIN_FEEDS.clone()
}

/// Load the feed list from an explicit path. Supports TOML or JSON formats.
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
}

/// Load the feed list using env var + fallbacks:
/// 1) $MACRO_INTEL_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in list
pub fn load_feeds_default() -> Result<Vec<FeedConfig>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("{ENV_FEEDS_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feeds_from(&json_p);
    }
    Ok(builtin_feeds())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<FeedConfig>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[feeds]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed list format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedConfig>> {
    #[derive(Deserialize)]
    struct TomlFeeds {
        feeds: Vec<FeedConfig>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(clean_list(v.feeds))
}

fn parse_json(s: &str) -> Result<Vec<FeedConfig>> {
    let v: Vec<FeedConfig> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim, drop incomplete entries and repeated names; order is kept (first wins).
fn clean_list(items: Vec<FeedConfig>) -> Vec<FeedConfig> {
    let mut out: Vec<FeedConfig> = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim();
        let url = it.url.trim();
        if name.is_empty() || url.is_empty() || out.iter().any(|f| f.name == name) {
            continue;
        }
        out.push(FeedConfig {
            name: name.to_string(),
            url: url.to_string(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn clean_and_formats_work() {
        let toml = r#"
[[feeds]]
name = " MACRO (CNBC) "
url = "https://a.test/rss"

[[feeds]]
name = ""
url = "https://b.test/rss"

[[feeds]]
name = "MACRO (CNBC)"
url = "https://c.test/rss"
"#;
        let json =
            r#"[{"name":"CRYPTO (X)","url":"https://x.test"},{"name":"ENERGY (Y)","url":"  "}]"#;

        let t = parse_toml(toml).unwrap();
        assert_eq!(
            t,
            vec![FeedConfig {
                name: "MACRO (CNBC)".into(),
                url: "https://a.test/rss".into()
            }]
        );
        let j = parse_json(json).unwrap();
        assert_eq!(j.len(), 1);
        assert_eq!(j[0].name, "CRYPTO (X)");
    }

    #[test]
    fn builtin_list_keeps_file_order() {
        let names: Vec<String> = builtin_feeds().into_iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "ENERGY (OilPrice)",
                "CRYPTO (CoinDesk)",
                "MACRO (CNBC)",
                "GEOPOLITICS (Defense News)"
            ]
        );
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD so the repo's own config/ is not picked up
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_FEEDS_PATH);

        // No files → built-in list
        let v = load_feeds_default().unwrap();
        assert_eq!(v.len(), 4);

        // Env takes precedence
        let p_json = tmp.path().join("feeds.json");
        fs::write(&p_json, r#"[{"name":"X","url":"https://x.test"}]"#).unwrap();
        env::set_var(ENV_FEEDS_PATH, p_json.display().to_string());
        let v2 = load_feeds_default().unwrap();
        assert_eq!(v2.len(), 1);
        assert_eq!(v2[0].name, "X");
        env::remove_var(ENV_FEEDS_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
