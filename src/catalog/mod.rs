// src/catalog/mod.rs

pub mod decode;
pub mod filename;
pub mod reader;

pub use decode::DecodingReader;
pub use filename::{extract_date_from_filename, UNKNOWN_DATE};
pub use reader::CatalogReader;

use crate::error::{ImportError, Result};
use std::{fs, path::Path};

/// What we know about the source file before reading a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// The path exactly as it was given.
    pub filename: String,
    pub size: u64,
    /// `YYYY-MM-DD`, or [`UNKNOWN_DATE`].
    pub date: String,
}

impl SourceInfo {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = fs::metadata(path)
            .map_err(|e| ImportError::input(format!("{}: {}", path.display(), e)))?;
        if !meta.is_file() {
            return Err(ImportError::input(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        Ok(Self {
            filename: path.to_string_lossy().into_owned(),
            size: meta.len(),
            date: extract_date_from_filename(path).unwrap_or_else(|| UNKNOWN_DATE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn source_info_from_dated_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("catalog_20230714.csv");
        fs::write(&path, b"A,B,C\n1,2,3\n")?;

        let info = SourceInfo::from_path(&path)?;
        assert_eq!(info.filename, path.to_string_lossy());
        assert_eq!(info.size, 12);
        assert_eq!(info.date, "2023-07-14");
        Ok(())
    }

    #[test]
    fn source_info_from_undated_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("catalog.csv");
        fs::write(&path, b"A,B\n")?;
        assert_eq!(SourceInfo::from_path(&path)?.date, "unknown");
        Ok(())
    }

    #[test]
    fn missing_source_is_an_input_error() -> Result<()> {
        let dir = tempdir()?;
        let err = SourceInfo::from_path(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, ImportError::Input(_)), "got {err:?}");
        Ok(())
    }

    #[test]
    fn directory_is_not_a_source() -> Result<()> {
        let dir = tempdir()?;
        let err = SourceInfo::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, ImportError::Input(_)), "got {err:?}");
        Ok(())
    }
}
