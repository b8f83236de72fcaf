//! N-gram windowing and frequency aggregation
//!
//! Counts every n-gram of a bounded corpus slice, keyed by the split
//! (first n-1 tokens, final token). The table keeps first-seen order so that
//! a later stable sort breaks ties the same way on every run.

use crate::error::{FreqError, FreqResult};
use indexmap::IndexMap;

/// One corpus example.
pub type TokenSequence = Vec<String>;

/// Overlapping windows of size `n` over `tokens`.
///
/// Yields `max(0, len - n + 1)` windows; a sequence shorter than `n` yields
/// nothing. `n` must be at least 1.
pub fn windows(tokens: &[String], n: usize) -> impl Iterator<Item = &[String]> + '_ {
    debug_assert!(n >= 1, "window size must be at least 1");
    let count = if n == 0 {
        0
    } else {
        (tokens.len() + 1).saturating_sub(n)
    };
    (0..count).map(move |start| &tokens[start..start + n])
}

/// Aggregation key: the first `n-1` tokens of a window and its last token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NGramKey {
    pub prefix: Vec<String>,
    pub suffix: String,
}

impl NGramKey {
    /// Split a non-empty window into (prefix, suffix).
    pub fn from_window(window: &[String]) -> Self {
        let (suffix, prefix) = window
            .split_last()
            .expect("windows are never empty");
        Self {
            prefix: prefix.to_vec(),
            suffix: suffix.clone(),
        }
    }

    /// Display label: prefix tokens and suffix joined by single spaces.
    pub fn label(&self) -> String {
        if self.prefix.is_empty() {
            return self.suffix.clone();
        }
        let mut label = self.prefix.join(" ");
        label.push(' ');
        label.push_str(&self.suffix);
        label
    }
}

/// Frozen n-gram occurrence counts in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountTable {
    n: usize,
    counts: IndexMap<NGramKey, u64>,
    examples: usize,
    windows: u64,
}

impl CountTable {
    /// Count n-grams over at most `limit` examples of `sequences`.
    ///
    /// Examples past the limit are never pulled from the iterator. Any error
    /// from the source aborts the pass and the partial table is dropped.
    pub fn aggregate<I>(sequences: I, n: usize, limit: usize) -> FreqResult<Self>
    where
        I: IntoIterator<Item = FreqResult<TokenSequence>>,
    {
        if n == 0 {
            return Err(FreqError::InvalidConfig(
                "n-gram size must be at least 1".to_string(),
            ));
        }

        let mut table = Self {
            n,
            ..Self::default()
        };

        for sequence in sequences.into_iter().take(limit) {
            let tokens = sequence?;
            for window in windows(&tokens, n) {
                *table.counts.entry(NGramKey::from_window(window)).or_insert(0) += 1;
                table.windows += 1;
            }
            table.examples += 1;
        }

        Ok(table)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of distinct n-grams
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Examples consumed by the bounded pass
    pub fn examples(&self) -> usize {
        self.examples
    }

    /// Total windows seen; always equals the sum of all counts
    pub fn total_windows(&self) -> u64 {
        self.windows
    }

    pub fn get(&self, key: &NGramKey) -> Option<u64> {
        self.counts.get(key).copied()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&NGramKey, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (k, *v))
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (NGramKey, u64)> {
        self.counts.into_iter()
    }
}

/// Item limit for a bounded pass: `floor(limit_prop * corpus_len)`.
pub fn item_limit(limit_prop: f64, corpus_len: usize) -> FreqResult<usize> {
    if !limit_prop.is_finite() || !(0.0..=1.0).contains(&limit_prop) {
        return Err(FreqError::InvalidConfig(format!(
            "limit proportion must be within [0, 1], got {}",
            limit_prop
        )));
    }
    Ok((limit_prop * corpus_len as f64).floor() as usize)
}
