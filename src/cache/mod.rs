//! Archive cache
//!
//! One lookup function, keyed by everything that changes the counts:
//! dataset, n, limit proportion, token field, and lowercasing. A hit loads
//! the archive; a miss computes and overwrites it.

pub mod paths;

pub use paths::{archive_path, default_cache_dir, ensure_cache_dir, plot_path_for};

use crate::archive::ResultArrays;
use crate::corpus::DEFAULT_TOKENS_KEY;
use crate::error::FreqResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deterministic identity of one counting run
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub dataset: String,
    pub n: usize,
    pub limit_prop: f64,
    pub tokens_key: String,
    pub lowercase: bool,
}

impl CacheKey {
    /// File stem, e.g. `2_gram_counts_wikicorpus_0.1%`.
    ///
    /// A non-default token field and lowercasing qualify the dataset segment
    /// so distinct runs never share a file.
    pub fn stem(&self) -> String {
        let mut dataset = paths::sanitize(&self.dataset);
        if self.tokens_key != DEFAULT_TOKENS_KEY {
            dataset.push('_');
            dataset.push_str(&paths::sanitize(&self.tokens_key));
        }
        if self.lowercase {
            dataset.push_str("_lower");
        }
        format!(
            "{}_gram_counts_{}_{}%",
            self.n,
            dataset,
            paths::percent_label(self.limit_prop)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Loaded from an existing archive
    Hit,
    /// No archive existed; computed and written
    Miss,
    /// Archive existed but was recomputed and overwritten on request
    Refreshed,
}

/// Load the archive for `key`, or compute and persist it.
///
/// With `refresh`, an existing archive is ignored and overwritten. If
/// `compute` or the write fails, nothing is left at the archive path beyond
/// what was there before.
pub fn load_or_compute<F>(
    cache_dir: &Path,
    key: &CacheKey,
    refresh: bool,
    compute: F,
) -> FreqResult<(ResultArrays, CacheStatus, PathBuf)>
where
    F: FnOnce() -> FreqResult<ResultArrays>,
{
    let path = archive_path(cache_dir, key);
    let exists = path.is_file();

    if exists && !refresh {
        debug!("Cache hit: {}", path.display());
        let arrays = ResultArrays::read_npz(&path)?;
        return Ok((arrays, CacheStatus::Hit, path));
    }

    debug!(
        "Cache {}: {}",
        if exists { "refresh" } else { "miss" },
        path.display()
    );
    let arrays = compute()?;
    ensure_cache_dir(cache_dir)?;
    arrays.write_npz(&path)?;

    let status = if exists {
        CacheStatus::Refreshed
    } else {
        CacheStatus::Miss
    };
    Ok((arrays, status, path))
}
