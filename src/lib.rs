//! Moodle Roster
//!
//! Turns a roster kept in Google Sheets into a Moodle bulk user upload CSV, and
//! optionally writes the result back into the spreadsheet.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod roster;
pub mod sink;

// Re-exports for convenience
pub use client::{Auth, GoogleSheets, MemorySheets, SheetsApi};
pub use config::{DEFAULT_SPREADSHEET, ExportRequest, VariantChoice};
pub use error::RosterError;
pub use etl::{Extractor, Loader, Transformer};
pub use roster::{OutputRecord, RosterTransformer, SchemaVariant, SourceRecord, TabExtractor};
pub use sink::{CsvDownload, Destination, SheetWriter, SinkRouter};
