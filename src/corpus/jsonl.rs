//! JSON Lines corpus: one record per line, tokens under a configured field

use super::{count_lines, example_lines, CorpusProvider, SequenceIter};
use crate::error::{FreqError, FreqResult};
use crate::ngram::TokenSequence;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct JsonlCorpus {
    name: String,
    paths: Vec<PathBuf>,
    tokens_key: String,
}

impl JsonlCorpus {
    pub fn new(name: &str, paths: Vec<PathBuf>, tokens_key: &str) -> Self {
        Self {
            name: name.to_string(),
            paths,
            tokens_key: tokens_key.to_string(),
        }
    }

    pub fn tokens_key(&self) -> &str {
        &self.tokens_key
    }

    fn parse_record(&self, path: &Path, index: usize, line: &str) -> FreqResult<TokenSequence> {
        let malformed = |reason: String| FreqError::MalformedExample {
            source_name: path.display().to_string(),
            index,
            reason,
        };

        let record: Value =
            serde_json::from_str(line).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;
        let field = record
            .get(&self.tokens_key)
            .ok_or_else(|| malformed(format!("missing field '{}'", self.tokens_key)))?;
        let items = field.as_array().ok_or_else(|| {
            malformed(format!("field '{}' is not an array", self.tokens_key))
        })?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    malformed(format!(
                        "field '{}' item {} is not a string",
                        self.tokens_key, i
                    ))
                })
            })
            .collect()
    }
}

impl CorpusProvider for JsonlCorpus {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> FreqResult<usize> {
        count_lines(&self.name, &self.paths)
    }

    fn sequences(&self, limit: usize) -> FreqResult<SequenceIter<'_>> {
        Ok(Box::new(example_lines(&self.name, &self.paths).take(limit).map(
            move |item| {
                let (path, index, line) = item?;
                self.parse_record(path, index, &line)
            },
        )))
    }
}
