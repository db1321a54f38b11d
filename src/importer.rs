// src/importer.rs

use crate::{
    archive::{self, ArchiveStats},
    catalog::{CatalogReader, SourceInfo},
    config::ImportConfig,
    db::{CatalogDb, MetaRecord},
    error::Result,
};
use std::time::Instant;
use tracing::{info, instrument};

/// Outcome of a completed import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub source: SourceInfo,
    pub columns: Vec<String>,
    pub rows_inserted: u64,
    /// The value written to `meta.partcount`.
    pub partcount: u64,
    pub archive: Option<ArchiveStats>,
}

/// Turns one vendor catalog CSV into the parts database and its archive.
pub struct CatalogImporter {
    config: ImportConfig,
    db: CatalogDb,
}

impl CatalogImporter {
    pub fn new(config: ImportConfig) -> Result<Self> {
        config.validate()?;
        let db = CatalogDb::new(&config.db_path);
        Ok(Self { config, db })
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn db(&self) -> &CatalogDb {
        &self.db
    }

    /// Convert, then archive.
    pub fn run(&self) -> Result<ImportSummary> {
        let mut summary = self.convert()?;
        summary.archive = Some(self.archive()?);
        Ok(summary)
    }

    /// Rebuild the database from the CSV and record the import in `meta`.
    #[instrument(level = "info", skip(self), fields(csv = %self.config.csv_path.display()))]
    pub fn convert(&self) -> Result<ImportSummary> {
        let start = Instant::now();
        info!("convert CSV to SQLite");

        let source = SourceInfo::from_path(&self.config.csv_path)?;
        info!(size = source.size, date = %source.date, "source file");

        let reader = CatalogReader::open(&self.config.csv_path, self.config.encoding)?;
        let columns = reader.columns().to_vec();
        self.db.create_tables(&columns)?;

        let rows_inserted = self
            .db
            .load_parts(columns.len(), reader, self.config.batch_size)?;
        let partcount = self.config.part_count.count(rows_inserted);

        self.db.write_meta(&MetaRecord::now(&source, partcount))?;
        info!(
            rows = rows_inserted,
            partcount,
            elapsed = ?start.elapsed(),
            "conversion complete"
        );

        Ok(ImportSummary {
            source,
            columns,
            rows_inserted,
            partcount,
            archive: None,
        })
    }

    /// Compress the database file for distribution.
    pub fn archive(&self) -> Result<ArchiveStats> {
        info!("compress SQLite to ZIP");
        archive::zip_database(&self.config.db_path, &self.config.archive_path)
    }
}
