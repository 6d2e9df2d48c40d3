//! Operator inputs for an export run

use crate::error::RosterError;
use crate::roster::{SchemaVariant, SessionConstants, SourceRecord};
use crate::sink::Destination;
use clap::ValueEnum;
use eyre::Result;
use std::path::{Path, PathBuf};

/// Spreadsheet opened when the operator does not name one
pub const DEFAULT_SPREADSHEET: &str = "CARGAS_MOODLE_LEGADO";

/// Roster layout selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum VariantChoice {
    /// Follow the write-back mode, or the columns when there is none
    #[default]
    Auto,
    /// CPF, Nome, E-mail
    Basic,
    /// CPF, Nome, Cargo, E-mail
    WithRole,
}

impl VariantChoice {
    /// The layout the operator forced, if any
    pub fn forced(self) -> Option<SchemaVariant> {
        match self {
            VariantChoice::Auto => None,
            VariantChoice::Basic => Some(SchemaVariant::Basic),
            VariantChoice::WithRole => Some(SchemaVariant::WithRole),
        }
    }

    /// Pick the layout for a run
    ///
    /// A forced layout wins. Under `Auto` a write-back destination decides, since each
    /// mode works with one layout only; otherwise the columns of `records` decide.
    pub fn resolve(self, destination: &Destination, records: &[SourceRecord]) -> SchemaVariant {
        self.forced()
            .or_else(|| destination.variant())
            .unwrap_or_else(|| {
                SchemaVariant::detect(records.iter().flat_map(SourceRecord::columns))
            })
    }
}

/// Everything the operator supplies for one export
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRequest {
    pub spreadsheet: String,
    pub source_tab: String,
    pub course: String,
    pub group: String,
    pub destination: Destination,
    pub variant: VariantChoice,
    pub output_dir: PathBuf,
}

impl ExportRequest {
    /// Fail with [`RosterError::MissingInput`] naming every blank required field
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("spreadsheet", &self.spreadsheet),
            ("source tab", &self.source_tab),
            ("course", &self.course),
            ("group", &self.group),
        ];
        let blank: Vec<String> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name.to_string())
            .collect();

        if !blank.is_empty() {
            return Err(RosterError::MissingInput { fields: blank }.into());
        }

        // course and group become the CSV file name
        for (field, value) in [("course", &self.course), ("group", &self.group)] {
            if value.contains(['/', '\\']) {
                return Err(RosterError::InvalidInput {
                    field: field.to_string(),
                    value: value.clone(),
                    reason: "path separators are not allowed".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn constants(&self) -> SessionConstants {
        SessionConstants::new(self.course.as_str(), self.group.as_str())
    }
}

/// Map the write-back flags onto a destination; a blank tab name means no write-back
pub fn destination_from_flags(new_tab: Option<String>, overwrite: bool) -> Destination {
    match new_tab {
        Some(tab) if !tab.trim().is_empty() => Destination::NewTab(tab),
        _ if overwrite => Destination::OverwriteSource,
        _ => Destination::DownloadOnly,
    }
}

/// Source a dotenv file into the process environment; a missing file is not an error
pub fn load_env(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match dotenvy::from_filename(path) {
        Ok(_) => {
            log::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No environment file at {}", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
