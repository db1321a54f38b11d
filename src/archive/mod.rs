// src/archive/mod.rs

use crate::error::{ImportError, Result};
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};
use tracing::{info, instrument};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

/// Deflate's strongest setting.
const MAX_DEFLATE_LEVEL: i64 = 9;
const ZIP32_LIMIT: u64 = u32::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    pub source_bytes: u64,
    pub archive_bytes: u64,
}

impl ArchiveStats {
    /// Archive size as a fraction of the source size.
    pub fn ratio(&self) -> f64 {
        if self.source_bytes == 0 {
            return 1.0;
        }
        self.archive_bytes as f64 / self.source_bytes as f64
    }
}

/// Write `db_path` into a fresh archive at `archive_path`, as a single entry
/// named after the database file.
#[instrument(level = "info", skip(db_path, archive_path), fields(db = %db_path.as_ref().display(), archive = %archive_path.as_ref().display()))]
pub fn zip_database(db_path: impl AsRef<Path>, archive_path: impl AsRef<Path>) -> Result<ArchiveStats> {
    let db_path = db_path.as_ref();
    let archive_path = archive_path.as_ref();

    let entry_name = db_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ImportError::archive(format!("{} has no file name", db_path.display())))?;
    let source = File::open(db_path).map_err(|e| io_error("opening", db_path, e))?;
    let source_bytes = source
        .metadata()
        .map_err(|e| io_error("reading metadata of", db_path, e))?
        .len();

    let out = File::create(archive_path).map_err(|e| io_error("creating", archive_path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(out));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(MAX_DEFLATE_LEVEL))
        .large_file(source_bytes >= ZIP32_LIMIT);
    zip.start_file(entry_name.as_str(), options)?;
    io::copy(&mut BufReader::new(source), &mut zip)
        .map_err(|e| io_error("compressing", db_path, e))?;
    zip.finish()?
        .flush()
        .map_err(|e| io_error("writing", archive_path, e))?;

    let archive_bytes = fs::metadata(archive_path)
        .map_err(|e| io_error("reading metadata of", archive_path, e))?
        .len();
    let stats = ArchiveStats {
        source_bytes,
        archive_bytes,
    };
    info!(
        source_bytes,
        archive_bytes,
        ratio = stats.ratio(),
        "archive written"
    );
    Ok(stats)
}

/// Read a single entry back out of an archive.
pub fn extract_entry(archive_path: impl AsRef<Path>, name: &str) -> Result<Vec<u8>> {
    let archive_path = archive_path.as_ref();
    let file = File::open(archive_path).map_err(|e| io_error("opening", archive_path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut entry = archive.by_name(name)?;
    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut buf)
        .map_err(|e| io_error("extracting", archive_path, e))?;
    Ok(buf)
}

fn io_error(action: &str, path: &Path, err: io::Error) -> ImportError {
    ImportError::archive(format!("{} {}: {}", action, path.display(), err))
}
