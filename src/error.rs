//! Error taxonomy reported to the operator.
//!
//! Failures travel as [`eyre::Report`]s; the ones the operator needs to tell apart are
//! raised as [`RosterError`] values so the CLI can downcast and classify them.

use thiserror::Error;

/// Errors that end an export run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Credentials are missing or were rejected by the remote service.
    #[error("authentication with Google Sheets failed: {reason}")]
    AuthenticationFailure { reason: String },

    /// One or more required operator inputs are blank.
    #[error("missing required input(s): {}", .fields.join(", "))]
    MissingInput { fields: Vec<String> },

    /// An operator input cannot be used as given.
    #[error("{field} '{value}' cannot be used in the CSV file name: {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The spreadsheet does not exist or is not shared with this identity.
    #[error("spreadsheet '{name}' was not found; check the name and sharing permissions")]
    SpreadsheetNotFound { name: String },

    /// The spreadsheet exists but has no tab with this name.
    #[error("tab '{tab}' was not found in spreadsheet '{spreadsheet}'")]
    TabNotFound { spreadsheet: String, tab: String },

    /// The source tab lacks required columns.
    #[error("source tab is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// The requested write-back mode is not offered for the schema variant.
    #[error("{mode} is not available for the {variant} roster layout")]
    UnsupportedDestination { mode: String, variant: String },

    /// Writing the records back into the spreadsheet failed.
    #[error("failed to write records to tab '{tab}': {message}")]
    WriteBackFailure { tab: String, message: String },

    /// Anything else, carrying the underlying message.
    #[error("unexpected failure: {message}")]
    UnexpectedFailure { message: String },
}

impl RosterError {
    /// Classify an arbitrary report, wrapping unknown failures as [`RosterError::UnexpectedFailure`].
    pub fn classify(report: &eyre::Report) -> RosterError {
        match report.downcast_ref::<RosterError>() {
            Some(err) => err.clone(),
            None => RosterError::UnexpectedFailure {
                message: chain_message(report),
            },
        }
    }
}

/// Join a report and its causes into a single line.
pub fn chain_message(report: &eyre::Report) -> String {
    report
        .chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}
