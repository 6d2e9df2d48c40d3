//! In-memory spreadsheet service
//!
//! Keeps spreadsheets as plain grids of values. Writes follow the remote service's
//! semantics closely enough for the roster sinks: a write overlays the block from `A1`
//! and leaves cells outside it untouched unless the tab is cleared or resized.

use super::{SheetsApi, Spreadsheet, Tab};
use crate::error::RosterError;
use eyre::Result;
use serde_json::Value;
use tokio::sync::Mutex;

struct MemoryTab {
    id: i64,
    title: String,
    rows: Vec<Vec<Value>>,
    grid: (usize, usize),
}

struct MemoryBook {
    id: String,
    name: String,
    tabs: Vec<MemoryTab>,
}

impl MemoryBook {
    fn tab_mut(&mut self, title: &str) -> Result<&mut MemoryTab> {
        let name = self.name.clone();
        self.tabs
            .iter_mut()
            .find(|t| t.title == title)
            .ok_or_else(|| {
                RosterError::TabNotFound {
                    spreadsheet: name,
                    tab: title.to_string(),
                }
                .into()
            })
    }

    fn snapshot(&self) -> Spreadsheet {
        Spreadsheet {
            id: self.id.clone(),
            name: self.name.clone(),
            tabs: self
                .tabs
                .iter()
                .map(|t| Tab {
                    id: t.id,
                    title: t.title.clone(),
                })
                .collect(),
        }
    }
}

/// Spreadsheet service backed by process memory
///
/// # Example
/// ```
/// use moodle_roster::client::{MemorySheets, SheetsApi};
/// use serde_json::json;
///
/// # async fn example() -> eyre::Result<()> {
/// let sheets = MemorySheets::new().with_tab(
///     "CARGAS",
///     "Turma",
///     vec![vec![json!("CPF"), json!("Nome")], vec![json!("123"), json!("Ana")]],
/// );
/// let spreadsheet = sheets.open("CARGAS").await?;
/// assert_eq!(sheets.values(&spreadsheet, "Turma").await?.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MemorySheets {
    books: Mutex<Vec<MemoryBook>>,
    fail_writes: bool,
    reject_credentials: bool,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tab with initial values, creating the spreadsheet if needed
    pub fn with_tab(mut self, spreadsheet: &str, tab: &str, rows: Vec<Vec<Value>>) -> Self {
        let books = self.books.get_mut();
        let index = match books.iter().position(|b| b.name == spreadsheet) {
            Some(index) => index,
            None => {
                books.push(MemoryBook {
                    id: format!("memory-{}", books.len()),
                    name: spreadsheet.to_string(),
                    tabs: Vec::new(),
                });
                books.len() - 1
            }
        };
        let book = &mut books[index];
        let grid = (
            rows.len().max(1000),
            rows.iter().map(Vec::len).max().unwrap_or(0).max(26),
        );
        book.tabs.push(MemoryTab {
            id: book.tabs.len() as i64,
            title: tab.to_string(),
            rows,
            grid,
        });
        self
    }

    /// Make every mutating call fail
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Make the credential check fail as a revoked token would
    pub fn rejecting_credentials(mut self) -> Self {
        self.reject_credentials = true;
        self
    }

    /// Current values of a tab, if it exists
    pub async fn tab_values(&self, spreadsheet: &str, tab: &str) -> Option<Vec<Vec<Value>>> {
        let books = self.books.lock().await;
        books
            .iter()
            .find(|b| b.name == spreadsheet)?
            .tabs
            .iter()
            .find(|t| t.title == tab)
            .map(|t| t.rows.clone())
    }

    /// Grid size (rows, columns) of a tab, if it exists
    pub async fn grid_size(&self, spreadsheet: &str, tab: &str) -> Option<(usize, usize)> {
        let books = self.books.lock().await;
        books
            .iter()
            .find(|b| b.name == spreadsheet)?
            .tabs
            .iter()
            .find(|t| t.title == tab)
            .map(|t| t.grid)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            eyre::bail!("simulated write failure");
        }
        Ok(())
    }
}

fn find_book<'a>(books: &'a mut [MemoryBook], spreadsheet: &Spreadsheet) -> Result<&'a mut MemoryBook> {
    books
        .iter_mut()
        .find(|b| b.id == spreadsheet.id)
        .ok_or_else(|| {
            RosterError::SpreadsheetNotFound {
                name: spreadsheet.name.clone(),
            }
            .into()
        })
}

impl SheetsApi for MemorySheets {
    async fn verify(&self) -> Result<()> {
        if self.reject_credentials {
            return Err(RosterError::AuthenticationFailure {
                reason: "access token was rejected".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn open(&self, name: &str) -> Result<Spreadsheet> {
        let books = self.books.lock().await;
        books
            .iter()
            .find(|b| b.name == name)
            .map(MemoryBook::snapshot)
            .ok_or_else(|| {
                RosterError::SpreadsheetNotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }

    async fn values(&self, spreadsheet: &Spreadsheet, tab: &str) -> Result<Vec<Vec<Value>>> {
        let mut books = self.books.lock().await;
        let book = find_book(&mut books, spreadsheet)?;
        Ok(book.tab_mut(tab)?.rows.clone())
    }

    async fn clear(&self, spreadsheet: &Spreadsheet, tab: &Tab) -> Result<()> {
        self.check_writable()?;
        let mut books = self.books.lock().await;
        let book = find_book(&mut books, spreadsheet)?;
        book.tab_mut(&tab.title)?.rows.clear();
        Ok(())
    }

    async fn add_tab(
        &self,
        spreadsheet: &Spreadsheet,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> Result<Tab> {
        self.check_writable()?;
        let mut books = self.books.lock().await;
        let book = find_book(&mut books, spreadsheet)?;
        if book.tabs.iter().any(|t| t.title == title) {
            eyre::bail!("A sheet with the name \"{}\" already exists", title);
        }
        let id = book.tabs.iter().map(|t| t.id + 1).max().unwrap_or(0);
        book.tabs.push(MemoryTab {
            id,
            title: title.to_string(),
            rows: Vec::new(),
            grid: (rows, cols),
        });
        Ok(Tab {
            id,
            title: title.to_string(),
        })
    }

    async fn write(
        &self,
        spreadsheet: &Spreadsheet,
        tab: &Tab,
        rows: &[Vec<String>],
        resize: bool,
    ) -> Result<()> {
        self.check_writable()?;
        let mut books = self.books.lock().await;
        let book = find_book(&mut books, spreadsheet)?;
        let target = book.tab_mut(&tab.title)?;

        for (r, row) in rows.iter().enumerate() {
            if target.rows.len() <= r {
                target.rows.push(Vec::new());
            }
            let cells = &mut target.rows[r];
            for (c, value) in row.iter().enumerate() {
                if cells.len() <= c {
                    cells.resize(c + 1, Value::String(String::new()));
                }
                cells[c] = Value::String(value.clone());
            }
        }

        if resize {
            let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
            target.rows.truncate(rows.len());
            for cells in &mut target.rows {
                cells.truncate(cols);
            }
            target.grid = (rows.len(), cols);
        }
        Ok(())
    }
}
