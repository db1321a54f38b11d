// src/db/mod.rs

pub mod meta;

pub use meta::{MetaRecord, META_COLUMNS};

use crate::error::Result;
use rusqlite::{params, params_from_iter, CachedStatement, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const ROTATION_COLUMNS: &[&str] = &["regex", "correction"];
const MAPPING_COLUMNS: &[&str] = &["footprint", "value", "LCSC"];

/// The on-disk parts database.
///
/// Holds only the path: every operation opens its own connection, commits,
/// and closes it again before returning.
#[derive(Debug, Clone)]
pub struct CatalogDb {
    path: PathBuf,
}

impl CatalogDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Ensure `meta`, `rotation` and `mapping` exist and rebuild `parts`
    /// with one untyped column per entry of `columns`.
    #[instrument(level = "info", skip(self, columns), fields(db = %self.path.display(), columns = columns.len()))]
    pub fn create_tables(&self, columns: &[String]) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!("CREATE TABLE IF NOT EXISTS meta ({})", column_list(META_COLUMNS)),
            [],
        )?;
        tx.execute("DROP TABLE IF EXISTS parts", [])?;
        tx.execute(&format!("CREATE TABLE parts ({})", column_list(columns)), [])?;
        tx.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS rotation ({})",
                column_list(ROTATION_COLUMNS)
            ),
            [],
        )?;
        tx.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS mapping ({})",
                column_list(MAPPING_COLUMNS)
            ),
            [],
        )?;
        tx.commit()?;
        debug!("schema ready");
        Ok(())
    }

    /// Insert every row into `parts` inside a single transaction, writing
    /// through a cached statement in batches of `batch_size`.
    /// Returns the number of rows inserted.
    #[instrument(level = "info", skip(self, rows), fields(db = %self.path.display()))]
    pub fn load_parts<I>(&self, width: usize, rows: I, batch_size: usize) -> Result<u64>
    where
        I: IntoIterator<Item = Result<Vec<String>>>,
    {
        let batch_size = batch_size.max(1);
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let sql = insert_sql("parts", width);

        let mut inserted = 0u64;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            let mut buffer: Vec<Vec<String>> = Vec::with_capacity(batch_size);
            for row in rows {
                buffer.push(row?);
                if buffer.len() >= batch_size {
                    inserted += flush_batch(&mut stmt, &mut buffer)?;
                    debug!(inserted, "flushed batch");
                }
            }
            if !buffer.is_empty() {
                inserted += flush_batch(&mut stmt, &mut buffer)?;
            }
        }
        tx.commit()?;

        info!(inserted, "parts loaded");
        Ok(inserted)
    }

    /// Replace the contents of `meta` with `record`.
    pub fn write_meta(&self, record: &MetaRecord) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM meta", [])?;
        tx.execute(
            &insert_sql("meta", META_COLUMNS.len()),
            params![
                record.filename,
                record.size,
                record.partcount,
                record.date,
                record.last_update
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn read_meta(&self) -> Result<Option<MetaRecord>> {
        let conn = self.connect()?;
        let record = conn
            .query_row(
                "SELECT filename, size, partcount, date, last_update FROM meta LIMIT 1",
                [],
                |r| {
                    Ok(MetaRecord {
                        filename: r.get(0)?,
                        size: r.get(1)?,
                        partcount: r.get(2)?,
                        date: r.get(3)?,
                        last_update: r.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn meta_row_count(&self) -> Result<u64> {
        self.count_rows("meta")
    }

    pub fn parts_row_count(&self) -> Result<u64> {
        self.count_rows("parts")
    }

    /// Column names of `parts`, in table order.
    pub fn parts_columns(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('parts') ORDER BY cid")?;
        let names = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// All rows of `parts`, every value read back as text.
    pub fn parts_rows(&self) -> Result<Vec<Vec<String>>> {
        let width = self.parts_columns()?.len();
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM parts ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |r| {
                (0..width)
                    .map(|i| r.get::<_, String>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn table_names(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    fn count_rows(&self, table: &str) -> Result<u64> {
        let conn = self.connect()?;
        let n: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |r| r.get(0),
        )?;
        Ok(n as u64)
    }
}

fn flush_batch(stmt: &mut CachedStatement<'_>, buffer: &mut Vec<Vec<String>>) -> Result<u64> {
    let mut n = 0u64;
    for row in buffer.drain(..) {
        stmt.execute(params_from_iter(row.iter()))?;
        n += 1;
    }
    Ok(n)
}

/// Quote `name` as an SQLite identifier, so header text can never be read
/// as a keyword or break out of the column list.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn column_list<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_sql(table: &str, width: usize) -> String {
    format!(
        "INSERT INTO {} VALUES ({})",
        quote_ident(table),
        vec!["?"; width].join(", ")
    )
}
