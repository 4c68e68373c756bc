//! Error types for the projection pipeline.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for pos-projector
#[derive(Error, Debug)]
pub enum Error {
    /// File could not be read or written
    #[error("File I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file does not follow its expected layout
    #[error("Malformed input at {path:?}:{line}: {reason}")]
    MalformedInput {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Mismatched file sets or unusable scores
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source form missing from its own annotated block (strict projection)
    #[error("Source form {form:?} not found in the '{language}' block for {sentence:?}")]
    UnmatchedSource {
        language: String,
        sentence: String,
        form: String,
    },

    /// Checkpoint content does not fit the current run
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Read a whole file, attaching its path to any failure
pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
