//! ngram-freq - bounded-pass n-gram frequency counting
//!
//! Reads a corpus through a [`corpus::CorpusProvider`], counts n-grams keyed by
//! (prefix, suffix) over a configured share of it, and caches the sorted
//! label/count arrays as a NumPy `.npz` archive with a log-log frequency plot
//! alongside.
//!
//! ```rust,ignore
//! use ngram_freq::corpus::MemoryCorpus;
//! use ngram_freq::ngram::CountTable;
//! use ngram_freq::archive::ResultArrays;
//!
//! let corpus = MemoryCorpus::from_tokens("toy", &[&["a", "b", "c"], &["b", "c", "d"]]);
//! let table = CountTable::aggregate(corpus.sequences(2)?, 2, 2)?;
//! let arrays = ResultArrays::from_table(table, true);
//! arrays.write_npz(Path::new("2_gram_counts_toy_100.0%.npz"))?;
//! ```

pub mod archive;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod ngram;
pub mod pipeline;
pub mod plot;

pub use error::{FreqError, FreqResult};
