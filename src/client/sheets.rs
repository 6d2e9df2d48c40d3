//! The spreadsheet capability used by the roster pipeline

use eyre::Result;
use serde_json::Value;
use std::future::Future;

/// A tab (worksheet) inside a spreadsheet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    pub id: i64,
    pub title: String,
}

/// An opened spreadsheet and the tabs it had when it was opened
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spreadsheet {
    pub id: String,
    pub name: String,
    pub tabs: Vec<Tab>,
}

impl Spreadsheet {
    /// Look up a tab by its exact title
    pub fn tab(&self, title: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.title == title)
    }

    pub fn has_tab(&self, title: &str) -> bool {
        self.tab(title).is_some()
    }
}

/// Read and write operations against a spreadsheet service
///
/// Every method is a single attempt: implementations do not retry.
pub trait SheetsApi: Send + Sync {
    /// Check that the configured credentials are accepted
    fn verify(&self) -> impl Future<Output = Result<()>> + Send;

    /// Open a spreadsheet by its name
    ///
    /// # Errors
    /// [`crate::RosterError::SpreadsheetNotFound`] when no spreadsheet with that name is
    /// visible to the running identity.
    fn open(&self, name: &str) -> impl Future<Output = Result<Spreadsheet>> + Send;

    /// All cell values of a tab, row by row, unformatted
    fn values(
        &self,
        spreadsheet: &Spreadsheet,
        tab: &str,
    ) -> impl Future<Output = Result<Vec<Vec<Value>>>> + Send;

    /// Remove every value from a tab
    fn clear(&self, spreadsheet: &Spreadsheet, tab: &Tab)
    -> impl Future<Output = Result<()>> + Send;

    /// Create a new tab with the given grid size
    fn add_tab(
        &self,
        spreadsheet: &Spreadsheet,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> impl Future<Output = Result<Tab>> + Send;

    /// Write a rectangular block starting at `A1`, as if typed by a user
    ///
    /// When `resize` is set the tab grid is shrunk or grown to exactly fit the block.
    fn write(
        &self,
        spreadsheet: &Spreadsheet,
        tab: &Tab,
        rows: &[Vec<String>],
        resize: bool,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Quote a tab title for use in A1 notation
pub fn a1_range(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}
