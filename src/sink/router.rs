//! Chooses and runs the sinks for one export

use super::download::{CsvDownload, Download};
use super::sheet::SheetWriter;
use crate::client::SheetsApi;
use crate::error::{RosterError, chain_message};
use crate::etl::Loader;
use crate::roster::{OutputRecord, SchemaVariant};
use eyre::Result;
use std::path::PathBuf;

/// Write-back requested by the operator, on top of the download
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Only produce the CSV file
    DownloadOnly,
    /// Also write to the named tab (basic layout)
    NewTab(String),
    /// Also replace the source tab (with-role layout)
    OverwriteSource,
}

impl Destination {
    /// The layout this write-back mode works with, if it needs a particular one
    pub fn variant(&self) -> Option<SchemaVariant> {
        match self {
            Destination::DownloadOnly => None,
            Destination::NewTab(_) => Some(SchemaVariant::Basic),
            Destination::OverwriteSource => Some(SchemaVariant::WithRole),
        }
    }

    /// Reject write-back modes the layout does not offer
    pub fn check(&self, variant: SchemaVariant) -> Result<()> {
        let mode = match (self, variant) {
            (Destination::DownloadOnly, _)
            | (Destination::NewTab(_), SchemaVariant::Basic)
            | (Destination::OverwriteSource, SchemaVariant::WithRole) => return Ok(()),
            (Destination::NewTab(_), _) => "writing to a new tab",
            (Destination::OverwriteSource, _) => "overwriting the source tab",
        };
        Err(RosterError::UnsupportedDestination {
            mode: mode.to_string(),
            variant: variant.to_string(),
        }
        .into())
    }

    /// The sheet writer for this destination, if any
    pub fn writer<'a, C: SheetsApi>(
        &self,
        client: &'a C,
        spreadsheet: &str,
        source_tab: &str,
    ) -> Option<SheetWriter<'a, C>> {
        match self {
            Destination::DownloadOnly => None,
            Destination::NewTab(tab) => Some(SheetWriter::new_tab(client, spreadsheet, tab)),
            Destination::OverwriteSource => {
                Some(SheetWriter::overwrite_source(client, spreadsheet, source_tab))
            }
        }
    }
}

/// Result of routing one record set
#[derive(Debug)]
pub struct RouteOutcome {
    /// The prepared upload file; present even when the write-back failed
    pub download: Download,
    /// Where the upload file was saved
    pub csv_path: PathBuf,
    /// `None` when no write-back was requested
    pub write_back: Option<Result<usize, RosterError>>,
}

impl RouteOutcome {
    pub fn write_back_failed(&self) -> bool {
        matches!(self.write_back, Some(Err(_)))
    }
}

/// Sends records to the download and, optionally, one spreadsheet tab
pub struct SinkRouter<'a, C> {
    download: CsvDownload,
    output_dir: PathBuf,
    write_back: Option<SheetWriter<'a, C>>,
}

impl<'a, C: SheetsApi> SinkRouter<'a, C> {
    pub fn new(
        download: CsvDownload,
        output_dir: impl Into<PathBuf>,
        write_back: Option<SheetWriter<'a, C>>,
    ) -> Self {
        Self {
            download,
            output_dir: output_dir.into(),
            write_back,
        }
    }

    /// Render and save the download, then run the write-back
    ///
    /// The spreadsheet is not touched unless the CSV file is safely on disk.
    ///
    /// # Errors
    /// Failures to render or save the download are returned as errors; write-back
    /// failures are reported in [`RouteOutcome::write_back`] as
    /// [`RosterError::WriteBackFailure`].
    pub async fn route(&self, records: Vec<OutputRecord>) -> Result<RouteOutcome> {
        let download = self.download.render(&records)?;
        let csv_path = download.save(&self.output_dir)?;
        log::info!(
            "Saved {} with {} record(s)",
            csv_path.display(),
            records.len()
        );

        let write_back = match &self.write_back {
            Some(writer) => {
                let tab = writer.mode().tab().to_string();
                Some(writer.load(records).await.map_err(|e| {
                    log::debug!("Write-back to '{}' failed: {:?}", tab, e);
                    RosterError::WriteBackFailure {
                        tab,
                        message: chain_message(&e),
                    }
                }))
            }
            None => None,
        };

        Ok(RouteOutcome {
            download,
            csv_path,
            write_back,
        })
    }
}
