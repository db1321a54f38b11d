//! Convert a vendor parts catalog (legacy-encoded CSV) into a SQLite
//! database and pack that database into a zip for distribution.

pub mod archive;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod importer;

pub use config::{ImportConfig, PartCountConvention};
pub use error::{ImportError, Result};
pub use importer::{CatalogImporter, ImportSummary};
