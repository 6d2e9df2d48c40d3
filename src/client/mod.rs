//! Spreadsheet service clients.
//!
//! [`SheetsApi`] is the capability the extractor and the sheet writer are given. It is
//! implemented by [`GoogleSheets`] for the real service and by [`MemorySheets`] for
//! tests.

mod auth;
mod google;
mod memory;
mod sheets;

pub use auth::{ACCESS_TOKEN_VAR, Auth};
pub use google::{DRIVE_URL, GoogleSheets, SHEETS_URL};
pub use memory::MemorySheets;
pub use sheets::{SheetsApi, Spreadsheet, Tab};
