//! Counting pipeline: corpus → windows → counts → archive → plot

use crate::archive::ResultArrays;
use crate::cache::{self, CacheKey, CacheStatus};
use crate::config::{Config, CountingConfig};
use crate::corpus::{open_corpus, CorpusProvider};
use crate::error::FreqResult;
use crate::ngram::{item_limit, CountTable, TokenSequence};
use crate::plot::{archive_legend, plot_frequencies};
use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing::info;

/// Outcome of one `count` run
#[derive(Debug, Clone)]
pub struct CountReport {
    pub archive: PathBuf,
    pub plot: Option<PathBuf>,
    pub status: CacheStatus,
    pub arrays: ResultArrays,
    /// Examples consumed; `None` when the archive came from the cache
    pub examples_used: Option<usize>,
}

/// Count n-grams over the first `floor(limit_prop * len)` examples of
/// `provider`. `progress` is advanced once per example.
pub fn count_corpus(
    provider: &dyn CorpusProvider,
    settings: &CountingConfig,
    progress: &ProgressBar,
) -> FreqResult<CountTable> {
    let corpus_len = provider.len()?;
    let limit = item_limit(settings.limit_prop, corpus_len)?;
    info!(
        "Computing {}-grams over {} of {} examples from '{}'",
        settings.n,
        limit,
        corpus_len,
        provider.name()
    );

    progress.set_length(limit as u64);
    let lowercase = settings.lowercase;
    let sequences = provider
        .sequences(limit)?
        .map(move |sequence| sequence.map(|tokens| normalize(tokens, lowercase)))
        .inspect(|_| progress.inc(1));

    let table = CountTable::aggregate(sequences, settings.n, limit)?;
    info!("Number of examples used: {}", table.examples());
    info!("Number of {}-grams: {}", settings.n, table.len());
    Ok(table)
}

fn normalize(tokens: TokenSequence, lowercase: bool) -> TokenSequence {
    if lowercase {
        tokens.into_iter().map(|t| t.to_lowercase()).collect()
    } else {
        tokens
    }
}

/// Run the configured corpus through the cache: load the archive if present
/// (unless `refresh`), otherwise count, sort, and persist. Plots afterwards
/// when enabled.
pub fn run_count(config: &Config, refresh: bool, progress: &ProgressBar) -> FreqResult<CountReport> {
    config.validate()?;

    let key = CacheKey {
        dataset: config.corpus.name.clone(),
        n: config.counting.n,
        limit_prop: config.counting.limit_prop,
        tokens_key: config.corpus.tokens_key.clone(),
        lowercase: config.counting.lowercase,
    };
    let cache_dir = config.cache_dir();

    let mut examples_used = None;
    let (arrays, status, archive) = cache::load_or_compute(&cache_dir, &key, refresh, || {
        let provider = open_corpus(
            config.corpus.format,
            &config.corpus.name,
            config.corpus.paths.clone(),
            &config.corpus.tokens_key,
        )?;
        let table = count_corpus(provider.as_ref(), &config.counting, progress)?;
        examples_used = Some(table.examples());
        Ok(ResultArrays::from_table(table, true))
    })?;
    progress.finish_and_clear();

    match status {
        CacheStatus::Hit => info!("Loaded {} from cache", archive.display()),
        CacheStatus::Miss | CacheStatus::Refreshed => {
            info!("Saved {} entries to {}", arrays.len(), archive.display())
        }
    }

    let plot = if config.output.plot {
        let path = cache::plot_path_for(&archive);
        plot_frequencies(&arrays.counts, &archive_legend(&archive), &path)?;
        Some(path)
    } else {
        None
    };

    Ok(CountReport {
        archive,
        plot,
        status,
        arrays,
        examples_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusFormat, MemoryCorpus};

    fn settings(n: usize, limit_prop: f64) -> CountingConfig {
        CountingConfig {
            n,
            limit_prop,
            lowercase: false,
        }
    }

    #[test]
    fn test_count_corpus_scenario() {
        let corpus = MemoryCorpus::from_tokens("mem", &[&["a", "b", "c"], &["b", "c", "d"]]);
        let table = count_corpus(&corpus, &settings(2, 1.0), &ProgressBar::hidden()).unwrap();
        let arrays = ResultArrays::from_table(table, true);
        assert_eq!(arrays.labels, vec!["b c", "a b", "c d"]);
        assert_eq!(arrays.counts, vec![2, 1, 1]);
    }

    #[test]
    fn test_count_corpus_limit_truncates() {
        let corpus = MemoryCorpus::from_tokens("mem", &[&["a", "b"], &["a", "b"], &["c", "d"]]);
        // floor(0.5 * 3) = 1 example
        let table = count_corpus(&corpus, &settings(2, 0.5), &ProgressBar::hidden()).unwrap();
        assert_eq!(table.examples(), 1);
        assert_eq!(table.total_windows(), 1);
    }

    #[test]
    fn test_count_corpus_lowercase() {
        let corpus = MemoryCorpus::from_tokens("mem", &[&["The", "cat"], &["the", "CAT"]]);
        let mut s = settings(1, 1.0);
        s.lowercase = true;
        let arrays =
            ResultArrays::from_table(count_corpus(&corpus, &s, &ProgressBar::hidden()).unwrap(), true);
        assert_eq!(arrays.labels, vec!["the", "cat"]);
        assert_eq!(arrays.counts, vec![2, 2]);
    }

    #[test]
    fn test_count_corpus_advances_progress() {
        let corpus = MemoryCorpus::from_tokens("mem", &[&["a"], &["b"], &["c"], &["d"]]);
        let bar = ProgressBar::hidden();
        count_corpus(&corpus, &settings(1, 0.5), &bar).unwrap();
        assert_eq!(bar.length(), Some(2));
        assert_eq!(bar.position(), 2);
    }

    fn text_config(dir: &std::path::Path, plot: bool) -> Config {
        let corpus = dir.join("corpus.txt");
        std::fs::write(&corpus, "a b c\nb c d\n").unwrap();
        let mut config = Config::default();
        config.corpus.name = "toy".to_string();
        config.corpus.format = CorpusFormat::Text;
        config.corpus.paths = vec![corpus];
        config.counting.limit_prop = 1.0;
        config.output.cache_dir = Some(dir.join("cache"));
        config.output.plot = plot;
        config
    }

    #[test]
    fn test_run_count_miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let config = text_config(dir.path(), true);

        let first = run_count(&config, false, &ProgressBar::hidden()).unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(first.examples_used, Some(2));
        assert!(first
            .archive
            .ends_with("cache/2_gram_counts_toy_100.0%.npz"));
        assert!(first.plot.as_ref().unwrap().is_file());

        let second = run_count(&config, false, &ProgressBar::hidden()).unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.examples_used, None);
        assert_eq!(second.arrays, first.arrays);
    }

    #[test]
    fn test_run_count_refresh_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = text_config(dir.path(), false);

        let first = run_count(&config, false, &ProgressBar::hidden()).unwrap();
        let before = std::fs::read(&first.archive).unwrap();
        let second = run_count(&config, true, &ProgressBar::hidden()).unwrap();
        assert_eq!(second.status, CacheStatus::Refreshed);
        assert!(second.plot.is_none());
        assert_eq!(std::fs::read(&second.archive).unwrap(), before);
    }

    #[test]
    fn test_run_count_zero_limit_writes_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = text_config(dir.path(), false);
        config.counting.limit_prop = 0.0;

        let report = run_count(&config, false, &ProgressBar::hidden()).unwrap();
        assert!(report.arrays.is_empty());
        assert!(ResultArrays::read_npz(&report.archive).unwrap().is_empty());
    }

    #[test]
    fn test_run_count_missing_corpus_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = text_config(dir.path(), false);
        config.corpus.paths = vec![dir.path().join("missing.txt")];

        assert!(run_count(&config, false, &ProgressBar::hidden()).is_err());
        assert!(!dir.path().join("cache").exists());
    }
}
