// src/catalog/reader.rs

use super::decode::DecodingReader;
use crate::error::{ImportError, Result};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use encoding_rs::Encoding;
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Streams the data rows of a vendor catalog.
///
/// Bytes are decoded chunk by chunk (strictly, no replacement characters)
/// on their way into the tokenizer. Every record, the header included,
/// carries one trailing field that is not part of the catalog and is
/// dropped here.
pub struct CatalogReader {
    path: PathBuf,
    encoding: &'static Encoding,
    columns: Vec<String>,
    records: StringRecordsIntoIter<DecodingReader<File>>,
}

impl std::fmt::Debug for CatalogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogReader")
            .field("path", &self.path)
            .field("encoding", &self.encoding.name())
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl CatalogReader {
    #[instrument(level = "debug", skip(path, encoding), fields(path = %path.as_ref().display(), encoding = encoding.name()))]
    pub fn open(path: impl AsRef<Path>, encoding: &'static Encoding) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ImportError::input(format!("cannot read {}: {}", path.display(), e)))?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            // row widths are checked per record so the error can name the line
            .flexible(true)
            .from_reader(DecodingReader::new(file, encoding));

        let header = rdr
            .headers()
            .map_err(|e| csv_error(path, encoding, e))?
            .clone();
        if header.is_empty() {
            return Err(ImportError::input(format!(
                "{}: missing header row",
                path.display()
            )));
        }
        let columns: Vec<String> = header
            .iter()
            .take(header.len() - 1)
            .map(str::to_string)
            .collect();
        if columns.is_empty() {
            return Err(ImportError::input(format!(
                "{}: header has no importable columns",
                path.display()
            )));
        }
        debug!(columns = columns.len(), "parsed header");

        Ok(Self {
            path: path.to_path_buf(),
            encoding,
            columns,
            records: rdr.into_records(),
        })
    }

    /// Column names for the `parts` table, in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn trim_record(&self, record: &StringRecord) -> Result<Vec<String>> {
        if record.len() != self.columns.len() + 1 {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(ImportError::input(format!(
                "{} line {}: expected {} fields, found {}",
                self.path.display(),
                line,
                self.columns.len() + 1,
                record.len()
            )));
        }
        Ok(record
            .iter()
            .take(self.columns.len())
            .map(str::to_string)
            .collect())
    }
}

impl Iterator for CatalogReader {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(r) => r,
            Err(e) => return Some(Err(csv_error(&self.path, self.encoding, e))),
        };
        Some(self.trim_record(&record))
    }
}

/// Decode failures travel through the tokenizer as `InvalidData` I/O errors.
fn csv_error(path: &Path, encoding: &'static Encoding, err: csv::Error) -> ImportError {
    if let csv::ErrorKind::Io(io_err) = err.kind() {
        if io_err.kind() == io::ErrorKind::InvalidData {
            return ImportError::Encoding {
                path: path.to_path_buf(),
                encoding: encoding.name(),
                detail: io_err.to_string(),
            };
        }
    }
    err.into()
}
