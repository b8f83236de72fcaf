//! Corpus providers
//!
//! A provider knows how many examples a corpus holds and can stream its
//! token sequences in a stable order. One adapter per on-disk format; all of
//! them read their files lazily so a bounded pass never touches examples past
//! its limit.

mod jsonl;
mod memory;
mod text;

pub use jsonl::JsonlCorpus;
pub use memory::MemoryCorpus;
pub use text::TextCorpus;

use crate::error::{FreqError, FreqResult};
use crate::ngram::TokenSequence;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Field that holds the token sequence when none is configured
pub const DEFAULT_TOKENS_KEY: &str = "tokens";

/// Stream of examples in source order
pub type SequenceIter<'a> = Box<dyn Iterator<Item = FreqResult<TokenSequence>> + 'a>;

/// Capability interface implemented once per corpus format
pub trait CorpusProvider {
    /// Dataset name, used for logging and archive naming
    fn name(&self) -> &str;

    /// Number of examples in the corpus
    fn len(&self) -> FreqResult<usize>;

    fn is_empty(&self) -> FreqResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Examples in source order, at most `limit` of them
    fn sequences(&self, limit: usize) -> FreqResult<SequenceIter<'_>>;
}

/// On-disk corpus formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusFormat {
    /// One JSON object per line with a token-array field
    #[default]
    Jsonl,
    /// One example per line, whitespace-separated tokens
    Text,
}

impl std::str::FromStr for CorpusFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jsonl" | "json" => Ok(Self::Jsonl),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Unknown corpus format: {}. Use jsonl or text", s)),
        }
    }
}

/// Build the provider for `format` over `paths`, read in order.
pub fn open_corpus(
    format: CorpusFormat,
    name: &str,
    paths: Vec<PathBuf>,
    tokens_key: &str,
) -> FreqResult<Box<dyn CorpusProvider>> {
    if paths.is_empty() {
        return Err(FreqError::InvalidConfig(format!(
            "corpus '{}' has no input files",
            name
        )));
    }
    Ok(match format {
        CorpusFormat::Jsonl => Box::new(JsonlCorpus::new(name, paths, tokens_key)),
        CorpusFormat::Text => Box::new(TextCorpus::new(name, paths)),
    })
}

fn open_file(name: &str, path: &Path) -> FreqResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| FreqError::CorpusUnavailable {
            name: name.to_string(),
            path: path.to_path_buf(),
            source,
        })
}

/// Count non-blank lines across `paths`.
fn count_lines(name: &str, paths: &[PathBuf]) -> FreqResult<usize> {
    let mut total = 0;
    for path in paths {
        for line in open_file(name, path)?.lines() {
            if !line?.trim().is_empty() {
                total += 1;
            }
        }
    }
    Ok(total)
}

/// Non-blank lines across `paths`, tagged with their file and 0-based
/// example index. Files are opened only when the iterator reaches them.
fn example_lines<'a>(
    name: &'a str,
    paths: &'a [PathBuf],
) -> impl Iterator<Item = FreqResult<(&'a Path, usize, String)>> + 'a {
    paths
        .iter()
        .flat_map(move |path| {
            let lines: Box<dyn Iterator<Item = FreqResult<String>>> = match open_file(name, path) {
                Ok(reader) => Box::new(reader.lines().map(|l| l.map_err(FreqError::from))),
                Err(e) => Box::new(std::iter::once(Err(e))),
            };
            lines.map(move |line| line.map(move |l| (path.as_path(), l)))
        })
        .filter(|item| match item {
            Ok((_, line)) => !line.trim().is_empty(),
            Err(_) => true,
        })
        .enumerate()
        .map(|(index, item)| item.map(|(path, line)| (path, index, line)))
}
