// src/config.rs

use crate::error::{ImportError, Result};
use clap::ValueEnum;
use encoding_rs::{Encoding, GBK};
use std::path::PathBuf;

pub const DEFAULT_DB_FILE: &str = "parts.db";
pub const DEFAULT_ARCHIVE_FILE: &str = "parts.zip";
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// How `meta.partcount` is derived from the rows that were loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PartCountConvention {
    /// Number of data rows actually inserted. Differs from the legacy
    /// converter, which recorded `LastIndex`; use that for parity with
    /// databases it produced.
    #[default]
    Rows,
    /// Zero-based index of the last data row (one less than `Rows`, 0 when empty).
    LastIndex,
}

impl PartCountConvention {
    pub fn count(self, rows_inserted: u64) -> u64 {
        match self {
            Self::Rows => rows_inserted,
            Self::LastIndex => rows_inserted.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub archive_path: PathBuf,
    pub batch_size: usize,
    pub encoding: &'static Encoding,
    pub part_count: PartCountConvention,
}

impl ImportConfig {
    /// Defaults: `parts.db` / `parts.zip` in the working directory, GBK source,
    /// 1000-row batches.
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            archive_path: PathBuf::from(DEFAULT_ARCHIVE_FILE),
            batch_size: DEFAULT_BATCH_SIZE,
            encoding: GBK,
            part_count: PartCountConvention::default(),
        }
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = path.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_part_count(mut self, convention: PartCountConvention) -> Self {
        self.part_count = convention;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ImportError::input("batch size must be at least 1"));
        }
        if self.db_path == self.archive_path {
            return Err(ImportError::input(format!(
                "database and archive paths must differ ({})",
                self.db_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_output_names() {
        let cfg = ImportConfig::new("catalog.csv");
        assert_eq!(cfg.db_path, PathBuf::from("parts.db"));
        assert_eq!(cfg.archive_path, PathBuf::from("parts.zip"));
        assert_eq!(cfg.batch_size, 1000);
        assert_eq!(cfg.encoding, GBK);
        assert_eq!(cfg.part_count, PartCountConvention::Rows);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let cfg = ImportConfig::new("catalog.csv").with_batch_size(0);
        assert!(matches!(cfg.validate(), Err(ImportError::Input(_))));
    }

    #[test]
    fn part_count_conventions() {
        assert_eq!(PartCountConvention::Rows.count(2), 2);
        assert_eq!(PartCountConvention::LastIndex.count(2), 1);
        assert_eq!(PartCountConvention::LastIndex.count(0), 0);
    }
}
