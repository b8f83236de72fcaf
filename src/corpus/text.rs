//! Plain text corpus: one example per non-blank line, whitespace tokens

use super::{count_lines, example_lines, CorpusProvider, SequenceIter};
use crate::error::FreqResult;
use crate::ngram::TokenSequence;
use std::path::PathBuf;

pub struct TextCorpus {
    name: String,
    paths: Vec<PathBuf>,
}

impl TextCorpus {
    pub fn new(name: &str, paths: Vec<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            paths,
        }
    }
}

impl CorpusProvider for TextCorpus {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> FreqResult<usize> {
        count_lines(&self.name, &self.paths)
    }

    fn sequences(&self, limit: usize) -> FreqResult<SequenceIter<'_>> {
        Ok(Box::new(
            example_lines(&self.name, &self.paths)
                .take(limit)
                .map(|item| -> FreqResult<TokenSequence> {
                    let (_, _, line) = item?;
                    Ok(line.split_whitespace().map(str::to_string).collect())
                }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokens_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "the  cat\tsat\n\nthe dog\n").unwrap();
        let corpus = TextCorpus::new("pets", vec![path]);

        assert_eq!(corpus.len().unwrap(), 2);
        assert!(!corpus.is_empty().unwrap());
        let got: Vec<_> = corpus.sequences(5).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(got, vec![vec!["the", "cat", "sat"], vec!["the", "dog"]]);
    }
}
