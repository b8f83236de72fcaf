//! In-memory corpus for library callers and tests

use super::{CorpusProvider, SequenceIter};
use crate::error::FreqResult;
use crate::ngram::TokenSequence;

#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    name: String,
    examples: Vec<TokenSequence>,
}

impl MemoryCorpus {
    pub fn new(name: &str, examples: Vec<TokenSequence>) -> Self {
        Self {
            name: name.to_string(),
            examples,
        }
    }

    /// Build from string slices, e.g. `&[&["a", "b"], &["c"]]`.
    pub fn from_tokens(name: &str, examples: &[&[&str]]) -> Self {
        Self::new(
            name,
            examples
                .iter()
                .map(|ex| ex.iter().map(|t| t.to_string()).collect())
                .collect(),
        )
    }
}

impl CorpusProvider for MemoryCorpus {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> FreqResult<usize> {
        Ok(self.examples.len())
    }

    fn sequences(&self, limit: usize) -> FreqResult<SequenceIter<'_>> {
        Ok(Box::new(self.examples.iter().take(limit).cloned().map(Ok)))
    }
}
