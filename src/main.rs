use anyhow::{Context, Result};
use clap::Parser;
use partsdb::{
    config::{DEFAULT_ARCHIVE_FILE, DEFAULT_BATCH_SIZE, DEFAULT_DB_FILE},
    CatalogImporter, ImportConfig, PartCountConvention,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "partsdb",
    about = "Convert a vendor parts catalog CSV into a SQLite database and zip it"
)]
struct Args {
    /// Catalog CSV (GBK encoded)
    csv: PathBuf,

    /// Database file to (re)build
    #[arg(long, default_value = DEFAULT_DB_FILE)]
    db: PathBuf,

    /// Archive to write the database into
    #[arg(long, default_value = DEFAULT_ARCHIVE_FILE)]
    archive: PathBuf,

    /// Rows per insert batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// What to record as meta.partcount
    #[arg(long, value_enum, default_value_t = PartCountConvention::Rows)]
    partcount: PartCountConvention,

    /// Build the database only, skip the archive
    #[arg(long)]
    no_archive: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) arguments ────────────────────────────────────────────────
    let args = Args::parse();
    let config = ImportConfig::new(&args.csv)
        .with_db_path(&args.db)
        .with_archive_path(&args.archive)
        .with_batch_size(args.batch_size)
        .with_part_count(args.partcount);
    let importer = CatalogImporter::new(config).context("invalid arguments")?;

    // ─── 3) convert ──────────────────────────────────────────────────
    let summary = importer
        .convert()
        .with_context(|| format!("importing {}", args.csv.display()))?;
    info!(
        file = %summary.source.filename,
        date = %summary.source.date,
        columns = summary.columns.len(),
        parts = summary.partcount,
        db = %args.db.display(),
        "database ready"
    );

    // ─── 4) archive ──────────────────────────────────────────────────
    if args.no_archive {
        info!("archive skipped");
        return Ok(());
    }
    let stats = importer
        .archive()
        .with_context(|| format!("writing {}", args.archive.display()))?;
    info!(
        archive = %args.archive.display(),
        bytes = stats.archive_bytes,
        "all done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_path_is_required() {
        let err = Args::try_parse_from(["partsdb"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn only_one_csv_path_is_accepted() {
        let err = Args::try_parse_from(["partsdb", "a.csv", "b.csv"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn defaults_apply_to_a_bare_path() {
        let args = Args::try_parse_from(["partsdb", "catalog_20230714.csv"]).unwrap();
        assert_eq!(args.csv, PathBuf::from("catalog_20230714.csv"));
        assert_eq!(args.db, PathBuf::from(DEFAULT_DB_FILE));
        assert_eq!(args.archive, PathBuf::from(DEFAULT_ARCHIVE_FILE));
        assert_eq!(args.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(args.partcount, PartCountConvention::Rows);
        assert!(!args.no_archive);
    }

    #[test]
    fn legacy_partcount_flag() {
        let args =
            Args::try_parse_from(["partsdb", "--partcount", "last-index", "catalog.csv"]).unwrap();
        assert_eq!(args.partcount, PartCountConvention::LastIndex);
    }
}
