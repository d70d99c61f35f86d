//! Runtime settings resolved from the environment (after `.env` is loaded).

use std::path::PathBuf;

use crate::analyze::DEFAULT_MAX_SCORE;
use crate::ingest::{ScanConfig, DEFAULT_MAX_ENTRIES};
use crate::narrative::DEFAULT_BRIEF_PREFIX;

pub const ENV_LOG_PATH: &str = "MACRO_INTEL_LOG_PATH";
pub const ENV_BRIEF_DIR: &str = "MACRO_INTEL_BRIEF_DIR";
pub const ENV_BRIEF_PREFIX: &str = "MACRO_INTEL_BRIEF_PREFIX";
pub const ENV_MAX_SCORE: &str = "MACRO_INTEL_MAX_SCORE";
pub const ENV_MAX_ENTRIES: &str = "MACRO_INTEL_MAX_ENTRIES";

pub const DEFAULT_LOG_PATH: &str = "macro_intel_log.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_path: PathBuf,
    pub brief_dir: PathBuf,
    pub brief_prefix: String,
    pub scan: ScanConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            brief_dir: PathBuf::from("."),
            brief_prefix: DEFAULT_BRIEF_PREFIX.to_string(),
            scan: ScanConfig::default(),
        }
    }
}

impl Settings {
    /// Unset, empty or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            log_path: env_string(ENV_LOG_PATH).map(PathBuf::from).unwrap_or(d.log_path),
            brief_dir: env_string(ENV_BRIEF_DIR).map(PathBuf::from).unwrap_or(d.brief_dir),
            brief_prefix: env_string(ENV_BRIEF_PREFIX).unwrap_or(d.brief_prefix),
            scan: ScanConfig {
                max_score: parse_env(ENV_MAX_SCORE)
                    .filter(|v: &u32| *v >= 1)
                    .unwrap_or(DEFAULT_MAX_SCORE),
                max_entries: parse_env(ENV_MAX_ENTRIES)
                    .filter(|v: &usize| *v >= 1)
                    .unwrap_or(DEFAULT_MAX_ENTRIES),
            },
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|s| s.parse::<T>().ok())
}

/// Install the tracing subscriber. `RUST_LOG` overrides the default filter;
/// `MACRO_INTEL_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("macro_intel=info,liquidity_monitor=info,warn"));
    let json = std::env::var("MACRO_INTEL_LOG_JSON").ok().as_deref() == Some("1");

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: a subscriber installed earlier (e.g. by tests) wins
    let _ = if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear() {
        for k in [ENV_LOG_PATH, ENV_BRIEF_DIR, ENV_BRIEF_PREFIX, ENV_MAX_SCORE, ENV_MAX_ENTRIES] {
            env::remove_var(k);
        }
    }

    #[serial]
    #[test]
    fn defaults_without_env() {
        clear();
        assert_eq!(Settings::from_env(), Settings::default());
    }

    #[serial]
    #[test]
    fn env_overrides_and_bad_values_fall_back() {
        clear();
        env::set_var(ENV_LOG_PATH, "/tmp/x/log.csv");
        env::set_var(ENV_MAX_SCORE, "10");
        env::set_var(ENV_MAX_ENTRIES, "lots");
        env::set_var(ENV_BRIEF_PREFIX, "  ");
        let s = Settings::from_env();
        assert_eq!(s.log_path, PathBuf::from("/tmp/x/log.csv"));
        assert_eq!(s.scan.max_score, 10);
        assert_eq!(s.scan.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(s.brief_prefix, DEFAULT_BRIEF_PREFIX);

        env::set_var(ENV_MAX_SCORE, "0");
        assert_eq!(Settings::from_env().scan.max_score, DEFAULT_MAX_SCORE);
        clear();
    }
}
