use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

pub const UNKNOWN_DATE: &str = "unknown";

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})([0-9]{2})([0-9]{2})").expect("date pattern should parse"));

/// Extracts the catalog date from `path` as it was given, directories
/// included: the first run of 8 digits, read as `YYYYMMDD`.
/// Returns `Some("YYYY-MM-DD")` if found, else `None`.
///
/// The digits are not checked against the calendar; vendor names are taken as-is.
pub fn extract_date_from_filename(path: &Path) -> Option<String> {
    let name = path.to_string_lossy();
    let caps = DATE_RE.captures(&name)?;
    Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dated_catalog_name() {
        let date = extract_date_from_filename(Path::new("catalog_20230714.csv"));
        assert_eq!(date.as_deref(), Some("2023-07-14"));
    }

    #[test]
    fn undated_catalog_name() {
        assert_eq!(extract_date_from_filename(Path::new("catalog.csv")), None);
    }

    #[test]
    fn first_eight_digit_run_wins() {
        let date = extract_date_from_filename(Path::new("jlc_2021120199_20220505.csv"));
        assert_eq!(date.as_deref(), Some("2021-12-01"));
    }

    #[test]
    fn short_digit_runs_are_ignored() {
        assert_eq!(extract_date_from_filename(Path::new("parts_2023_07.csv")), None);
    }

    #[test]
    fn dated_directory_counts() {
        let date = extract_date_from_filename(Path::new("/data/20200101/catalog.csv"));
        assert_eq!(date.as_deref(), Some("2020-01-01"));
        let date = extract_date_from_filename(Path::new("dumps/20230714/catalog.csv"));
        assert_eq!(date.as_deref(), Some("2023-07-14"));
    }

    #[test]
    fn leftmost_date_in_path_wins() {
        let date = extract_date_from_filename(Path::new("dumps/20230101/catalog_20230714.csv"));
        assert_eq!(date.as_deref(), Some("2023-01-01"));
    }
}
