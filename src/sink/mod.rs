//! Destinations for transformed roster records
//!
//! The CSV download is always produced. A spreadsheet write-back is optional and its
//! failure is reported separately so the download stays usable.

mod download;
mod preview;
mod router;
mod sheet;

pub use download::{CsvDownload, Download};
pub use preview::{PREVIEW_ROWS, preview_table};
pub use router::{Destination, RouteOutcome, SinkRouter};
pub use sheet::{CellEncoding, SheetWriter, WriteMode};
