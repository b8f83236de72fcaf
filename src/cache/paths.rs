//! Cache path utilities - archives live under ~/.cache/ngram-freq/ by default

use super::CacheKey;
use std::path::{Path, PathBuf};

/// Default cache directory.
/// Uses the platform cache dir (~/.cache on Linux, %LOCALAPPDATA% on Windows),
/// falling back to ./data when none can be determined.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .map(|base| base.join("ngram-freq"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Archive path for a cache key.
pub fn archive_path(cache_dir: &Path, key: &CacheKey) -> PathBuf {
    cache_dir.join(format!("{}.npz", key.stem()))
}

/// Plot path sharing the archive's stem.
pub fn plot_path_for(archive: &Path) -> PathBuf {
    archive.with_extension("png")
}

/// Ensure the cache directory exists.
pub fn ensure_cache_dir(cache_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(cache_dir)?;
    Ok(cache_dir.to_path_buf())
}

/// Replace anything outside `[A-Za-z0-9._-]` so names are safe as file stems.
pub(crate) fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "corpus".to_string()
    } else {
        cleaned
    }
}

/// Format `limit_prop * 100` the way Python's `repr` prints a float: the
/// shortest round-trip digits, one decimal kept on integral values (`1.0`),
/// and exponent form (`9.999999999999999e-06`) below 1e-4 or from 1e16 up.
pub(crate) fn percent_label(limit_prop: f64) -> String {
    let pct = limit_prop * 100.0;
    let sci = format!("{:e}", pct);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if pct != 0.0 && pct.is_finite() && !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    } else if pct.fract() == 0.0 {
        format!("{:.1}", pct)
    } else {
        format!("{}", pct)
    }
}
