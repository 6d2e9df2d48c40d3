//! Reads roster rows from a spreadsheet tab

use super::record::{SourceRecord, cell_to_string};
use crate::client::SheetsApi;
use crate::error::RosterError;
use crate::etl::Extractor;
use eyre::Result;
use serde_json::Value;
use std::collections::BTreeSet;

/// Extractor for the rows of one spreadsheet tab
///
/// The first row is the header. Every following row becomes a [`SourceRecord`] keyed
/// by header name, with missing trailing cells filled with empty strings.
///
/// # Example
/// ```
/// use moodle_roster::client::MemorySheets;
/// use moodle_roster::etl::Extractor;
/// use moodle_roster::roster::TabExtractor;
/// use serde_json::json;
///
/// # async fn example() -> eyre::Result<()> {
/// let sheets = MemorySheets::new().with_tab(
///     "CARGAS",
///     "Turma",
///     vec![vec![json!("CPF"), json!("Nome")], vec![json!("123")]],
/// );
/// let rows = TabExtractor::new(&sheets, "CARGAS", "Turma").extract().await?;
/// assert_eq!(rows[0].get("Nome"), Some(&json!("")));
/// # Ok(())
/// # }
/// ```
pub struct TabExtractor<'a, C> {
    client: &'a C,
    spreadsheet: String,
    tab: String,
}

impl<'a, C: SheetsApi> TabExtractor<'a, C> {
    pub fn new(client: &'a C, spreadsheet: impl Into<String>, tab: impl Into<String>) -> Self {
        Self {
            client,
            spreadsheet: spreadsheet.into(),
            tab: tab.into(),
        }
    }
}

impl<C: SheetsApi> Extractor for TabExtractor<'_, C> {
    type Item = SourceRecord;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        log::debug!("Opening spreadsheet '{}'", self.spreadsheet);
        let spreadsheet = self.client.open(&self.spreadsheet).await?;

        if !spreadsheet.has_tab(&self.tab) {
            return Err(RosterError::TabNotFound {
                spreadsheet: self.spreadsheet.clone(),
                tab: self.tab.clone(),
            }
            .into());
        }

        let values = self.client.values(&spreadsheet, &self.tab).await?;
        let records = records_from_values(values)?;

        log::info!(
            "Read {} row(s) from '{}' / '{}'",
            records.len(),
            self.spreadsheet,
            self.tab
        );
        Ok(records)
    }
}

/// Zip value rows against the header row.
///
/// Columns with a blank header are skipped. A header naming the same column twice is
/// rejected because the rows could not be keyed unambiguously.
pub fn records_from_values(values: Vec<Vec<Value>>) -> Result<Vec<SourceRecord>> {
    let mut rows = values.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let header: Vec<String> = header.iter().map(cell_to_string).collect();
    let mut seen = BTreeSet::new();
    for name in header.iter().filter(|h| !h.is_empty()) {
        if !seen.insert(name.as_str()) {
            eyre::bail!("Header row contains duplicate column '{}'", name);
        }
    }

    let records: Vec<SourceRecord> = rows
        .map(|row| {
            let mut cells = row.into_iter();
            header
                .iter()
                .map(|name| {
                    let value = cells
                        .next()
                        .unwrap_or_else(|| Value::String(String::new()));
                    (name, value)
                })
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, value)| (name.clone(), value))
                .collect()
        })
        .collect();

    Ok(records)
}
