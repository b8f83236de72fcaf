//! Error types for the counting pipeline
//!
//! Every failure is fatal for the run: nothing here is caught and retried,
//! and no partial results are persisted.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, counting, or persisting n-grams
#[derive(Error, Debug)]
pub enum FreqError {
    #[error("Corpus '{name}' unavailable at {}: {source}", path.display())]
    CorpusUnavailable {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed example #{index} in {source_name}: {reason}")]
    MalformedExample {
        source_name: String,
        index: usize,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid archive: {0}")]
    Archive(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FreqResult<T> = Result<T, FreqError>;
