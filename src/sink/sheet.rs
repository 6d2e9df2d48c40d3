//! Write-back of upload records into a spreadsheet tab

use crate::client::{SheetsApi, Tab};
use crate::error::RosterError;
use crate::etl::Loader;
use crate::roster::{OutputField, OutputRecord};
use eyre::Result;
use owo_colors::OwoColorize;

/// Where the records go inside the spreadsheet
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// A named tab, created when missing and cleared when it already exists
    NewTab(String),
    /// The tab the roster was read from, replaced entirely
    OverwriteSource(String),
}

impl WriteMode {
    pub fn tab(&self) -> &str {
        match self {
            WriteMode::NewTab(tab) | WriteMode::OverwriteSource(tab) => tab,
        }
    }
}

/// How record values are rendered into cells
///
/// Values are entered as if typed by a user, so the spreadsheet infers their type. A
/// forced-text field is prefixed with an apostrophe, which keeps e.g. the leading
/// zeros of a CPF username.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellEncoding {
    force_text: Vec<OutputField>,
}

impl CellEncoding {
    /// Let the spreadsheet infer every cell
    pub fn plain() -> Self {
        Self::default()
    }

    /// Keep the given fields as text
    pub fn force_text(fields: impl IntoIterator<Item = OutputField>) -> Self {
        Self {
            force_text: fields.into_iter().collect(),
        }
    }

    pub fn is_forced(&self, field: OutputField) -> bool {
        self.force_text.contains(&field)
    }

    pub fn encode(&self, field: OutputField, value: &str) -> String {
        if self.is_forced(field) {
            format!("'{}", value)
        } else {
            value.to_string()
        }
    }

    /// Header row plus one encoded row per record
    pub fn block(&self, records: &[OutputRecord]) -> Vec<Vec<String>> {
        std::iter::once(OutputRecord::header())
            .chain(records.iter().map(|record| {
                OutputField::ALL
                    .iter()
                    .map(|field| self.encode(*field, record.get(*field)))
                    .collect()
            }))
            .collect()
    }
}

/// Loader writing records into a tab of a spreadsheet
///
/// # Example
/// ```
/// use moodle_roster::client::MemorySheets;
/// use moodle_roster::etl::Loader;
/// use moodle_roster::sink::SheetWriter;
/// use serde_json::json;
///
/// # async fn example() -> eyre::Result<()> {
/// let sheets = MemorySheets::new().with_tab("CARGAS", "Turma", vec![vec![json!("CPF")]]);
/// let writer = SheetWriter::new_tab(&sheets, "CARGAS", "Moodle");
/// let count = writer.load(Vec::new()).await?;
/// assert_eq!(count, 0);
/// # Ok(())
/// # }
/// ```
pub struct SheetWriter<'a, C> {
    client: &'a C,
    spreadsheet: String,
    mode: WriteMode,
    encoding: CellEncoding,
}

impl<'a, C: SheetsApi> SheetWriter<'a, C> {
    pub fn new(
        client: &'a C,
        spreadsheet: impl Into<String>,
        mode: WriteMode,
        encoding: CellEncoding,
    ) -> Self {
        Self {
            client,
            spreadsheet: spreadsheet.into(),
            mode,
            encoding,
        }
    }

    /// Write to a separate tab, keeping usernames as text
    pub fn new_tab(client: &'a C, spreadsheet: impl Into<String>, tab: impl Into<String>) -> Self {
        Self::new(
            client,
            spreadsheet,
            WriteMode::NewTab(tab.into()),
            CellEncoding::force_text([OutputField::Username]),
        )
    }

    /// Replace the source tab, letting the spreadsheet infer cell types
    pub fn overwrite_source(
        client: &'a C,
        spreadsheet: impl Into<String>,
        tab: impl Into<String>,
    ) -> Self {
        Self::new(
            client,
            spreadsheet,
            WriteMode::OverwriteSource(tab.into()),
            CellEncoding::plain(),
        )
    }

    pub fn mode(&self) -> &WriteMode {
        &self.mode
    }

    pub fn encoding(&self) -> &CellEncoding {
        &self.encoding
    }
}

impl<C: SheetsApi> Loader for SheetWriter<'_, C> {
    type Item = OutputRecord;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let spreadsheet = self.client.open(&self.spreadsheet).await?;
        let block = self.encoding.block(&items);

        let tab: Tab = match &self.mode {
            WriteMode::NewTab(title) => match spreadsheet.tab(title) {
                Some(existing) => {
                    log::warn!(
                        "Tab {} already exists and will be overwritten",
                        title.yellow()
                    );
                    self.client.clear(&spreadsheet, existing).await?;
                    existing.clone()
                }
                None => {
                    log::debug!("Creating tab '{}'", title);
                    self.client
                        .add_tab(&spreadsheet, title, items.len() + 1, OutputField::ALL.len())
                        .await?
                }
            },
            WriteMode::OverwriteSource(title) => {
                let existing =
                    spreadsheet
                        .tab(title)
                        .ok_or_else(|| RosterError::TabNotFound {
                            spreadsheet: self.spreadsheet.clone(),
                            tab: title.clone(),
                        })?;
                log::debug!("Replacing contents of source tab '{}'", title);
                self.client.clear(&spreadsheet, existing).await?;
                existing.clone()
            }
        };

        self.client.write(&spreadsheet, &tab, &block, true).await?;

        log::info!(
            "Wrote {} record(s) to {} / {}",
            items.len(),
            self.spreadsheet.bright_black(),
            tab.title.bright_black()
        );
        Ok(items.len())
    }
}
