//! Run configuration
//!
//! Loaded from `ngram-freq.toml` in the working directory (or an explicit
//! `--config` path). CLI flags override file values.
//!
//! # Configuration Format
//!
//! ```toml
//! [corpus]
//! name = "wikicorpus"
//! format = "jsonl"        # jsonl or text
//! paths = ["data/wikicorpus/train.jsonl"]
//! tokens_key = "sentence"
//!
//! [counting]
//! n = 2
//! limit_prop = 0.001
//! lowercase = false
//!
//! [output]
//! cache_dir = "data"
//! plot = true
//! ```

use crate::cache::default_cache_dir;
use crate::corpus::{CorpusFormat, DEFAULT_TOKENS_KEY};
use crate::error::{FreqError, FreqResult};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "ngram-freq.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub counting: CountingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Dataset name used in archive file names
    pub name: String,
    pub format: CorpusFormat,
    /// Input files, read in order (e.g. train, test, validation splits)
    pub paths: Vec<PathBuf>,
    /// Record field holding the token array (jsonl only)
    pub tokens_key: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            name: "corpus".to_string(),
            format: CorpusFormat::default(),
            paths: Vec::new(),
            tokens_key: DEFAULT_TOKENS_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CountingConfig {
    /// N-gram size
    pub n: usize,
    /// Share of the corpus to count, in [0, 1]
    pub limit_prop: f64,
    /// Lowercase tokens before counting
    pub lowercase: bool,
}

impl Default for CountingConfig {
    fn default() -> Self {
        Self {
            n: 2,
            limit_prop: 0.01,
            lowercase: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Archive/plot directory (default: platform cache dir)
    pub cache_dir: Option<PathBuf>,
    /// Render the frequency plot after counting
    pub plot: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            plot: true,
        }
    }
}

impl Config {
    /// Effective cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.output.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> FreqResult<()> {
        if self.counting.n == 0 {
            return Err(FreqError::InvalidConfig(
                "counting.n must be at least 1".to_string(),
            ));
        }
        let p = self.counting.limit_prop;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(FreqError::InvalidConfig(format!(
                "counting.limit_prop must be within [0, 1], got {}",
                p
            )));
        }
        if self.corpus.tokens_key.is_empty() {
            return Err(FreqError::InvalidConfig(
                "corpus.tokens_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Make relative corpus and cache paths relative to `base`.
    fn resolve_paths(&mut self, base: &Path) {
        for path in &mut self.corpus.paths {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(dir) = self.output.cache_dir.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}

/// Load `ngram-freq.toml` from `dir`.
///
/// Returns defaults when no file exists. A file that fails to parse is
/// logged and ignored.
pub fn load_config(dir: &Path) -> Config {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!("No {} found in {}, using defaults", CONFIG_FILE_NAME, dir.display());
        return Config::default();
    }
    match load_config_file(&path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {:#}", path.display(), e);
            Config::default()
        }
    }
}

/// Load an explicit config file; errors are returned, not swallowed.
pub fn load_config_file(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    Ok(config)
}

/// Example config written by `ngram-freq init`
pub const EXAMPLE_CONFIG: &str = r#"# ngram-freq configuration

[corpus]
# Dataset name, used in archive file names
name = "wikicorpus"

# Input format: "jsonl" (one JSON object per line) or "text" (one example per line)
format = "jsonl"

# Input files, read in order. Relative paths are resolved against this file.
paths = ["data/wikicorpus/train.jsonl"]

# JSON field holding the token array (jsonl only)
tokens_key = "sentence"

[counting]
# N-gram size
n = 2

# Share of the corpus to count, in [0, 1]
limit_prop = 0.001

# Lowercase tokens before counting
lowercase = false

[output]
# Where archives (.npz) and plots (.png) go. Default: platform cache dir
# cache_dir = "data"

# Render a log-log frequency plot after counting
plot = true
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.counting.n, 2);
        assert_eq!(config.counting.limit_prop, 0.01);
        assert_eq!(config.corpus.tokens_key, "tokens");
        assert!(config.output.plot);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.corpus.name, "wikicorpus");
        assert_eq!(config.corpus.format, CorpusFormat::Jsonl);
        assert_eq!(config.corpus.tokens_key, "sentence");
        assert_eq!(config.counting.limit_prop, 0.001);
        assert!(config.output.cache_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[counting]\nn = 3\n").unwrap();
        assert_eq!(config.counting.n, 3);
        assert_eq!(config.counting.limit_prop, 0.01);
        assert_eq!(config.corpus.format, CorpusFormat::Jsonl);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.counting.n = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.counting.limit_prop = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.corpus.tokens_key.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[corpus]\npaths = [\"train.txt\", \"/abs/test.txt\"]\nformat = \"text\"\n\n[output]\ncache_dir = \"out\"\n",
        )
        .unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.corpus.format, CorpusFormat::Text);
        assert_eq!(config.corpus.paths[0], dir.path().join("train.txt"));
        assert_eq!(config.corpus.paths[1], PathBuf::from("/abs/test.txt"));
        assert_eq!(config.cache_dir(), dir.path().join("out"));
    }

    #[test]
    fn test_load_config_ignores_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[counting\nn = ").unwrap();
        assert_eq!(load_config(dir.path()), Config::default());
        assert!(load_config_file(&dir.path().join(CONFIG_FILE_NAME)).is_err());
    }

    #[test]
    fn test_load_config_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(dir.path()), Config::default());
    }
}
