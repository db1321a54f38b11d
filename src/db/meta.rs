// src/db/meta.rs

use crate::catalog::SourceInfo;
use chrono::{DateTime, Local, TimeZone};

/// Column order of the `meta` table.
pub const META_COLUMNS: &[&str] = &["filename", "size", "partcount", "date", "last_update"];

/// The single row describing the most recent import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaRecord {
    pub filename: String,
    pub size: i64,
    pub partcount: i64,
    pub date: String,
    pub last_update: String,
}

impl MetaRecord {
    pub fn new<Tz: TimeZone>(source: &SourceInfo, partcount: u64, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            filename: source.filename.clone(),
            size: i64::try_from(source.size).unwrap_or(i64::MAX),
            partcount: i64::try_from(partcount).unwrap_or(i64::MAX),
            date: source.date.clone(),
            last_update: format_timestamp(now),
        }
    }

    /// Stamp the record with the current local time.
    pub fn now(source: &SourceInfo, partcount: u64) -> Self {
        Self::new(source, partcount, &Local::now())
    }
}

/// `YYYY-MM-DDTHH:MM:SS.ffffff`, lexically sortable.
pub fn format_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn timestamp_has_microseconds() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(7, 5, 1, 42)
            .unwrap()
            .and_utc();
        assert_eq!(format_timestamp(&dt), "2024-03-09T07:05:01.000042");
    }

    #[test]
    fn record_copies_source_fields() {
        let source = SourceInfo {
            filename: "catalog_20230714.csv".into(),
            size: 1234,
            date: "2023-07-14".into(),
        };
        let meta = MetaRecord::new(&source, 2, &Utc::now());
        assert_eq!(meta.filename, "catalog_20230714.csv");
        assert_eq!(meta.size, 1234);
        assert_eq!(meta.partcount, 2);
        assert_eq!(meta.date, "2023-07-14");
        assert_eq!(meta.last_update.len(), "2024-03-09T07:05:01.000042".len());
    }
}
