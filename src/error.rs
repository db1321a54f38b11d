// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

/// Everything that can abort an import. There is no local recovery: the first
/// error ends the run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Missing or unreadable source, bad arguments, or a CSV shape we cannot import.
    #[error("input error: {0}")]
    Input(String),

    /// Source bytes are not valid in the expected legacy encoding.
    #[error("{path}: not valid {encoding} text ({detail})")]
    Encoding {
        path: PathBuf,
        encoding: &'static str,
        detail: String,
    },

    /// CSV tokenizer failure (unterminated quote, etc.).
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The database file cannot be created, written or committed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The compressed output cannot be written or read back.
    #[error("archive error: {0}")]
    Archive(String),
}

impl ImportError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }
}

impl From<zip::result::ZipError> for ImportError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}
