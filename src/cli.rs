//! CLI helper functions

use crate::{
    client::{Auth, GoogleSheets, SheetsApi},
    config::ExportRequest,
    error::RosterError,
    etl::{Extractor, Transformer},
    roster::{RosterTransformer, SchemaVariant, TabExtractor},
    sink::{CsvDownload, PREVIEW_ROWS, SinkRouter, preview_table},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use url::Url;

/// Summary of a finished export
#[derive(Debug)]
pub struct ExportReport {
    pub variant: SchemaVariant,
    pub records: usize,
    pub csv_path: PathBuf,
    /// `None` when no write-back was requested
    pub write_back: Option<Result<usize, RosterError>>,
}

/// Build the Google Sheets client from environment variables
///
/// Expected environment variables:
/// - GOOGLE_ACCESS_TOKEN: OAuth access token with Sheets and Drive scopes (required)
/// - GOOGLE_SHEETS_URL: Sheets API base URL (optional)
/// - GOOGLE_DRIVE_URL: Drive API base URL (optional)
pub fn load_sheets_client() -> Result<GoogleSheets> {
    let auth = Auth::from_env();
    log::debug!("Using {} authentication", auth);
    let client = GoogleSheets::try_new(auth)?;

    let sheets_url = env_url("GOOGLE_SHEETS_URL")?;
    let drive_url = env_url("GOOGLE_DRIVE_URL")?;
    Ok(match (sheets_url, drive_url) {
        (None, None) => client,
        (sheets, drive) => {
            let sheets = sheets.unwrap_or_else(|| client.sheets_url().clone());
            let drive = drive.unwrap_or_else(|| client.drive_url().clone());
            client.with_base_urls(sheets, drive)
        }
    })
}

fn env_url(var: &str) -> Result<Option<Url>> {
    match std::env::var(var) {
        Ok(value) => Url::parse(&value)
            .map(Some)
            .with_context(|| format!("Invalid {}: {}", var, value)),
        Err(_) => Ok(None),
    }
}

/// Check that the service accepts our credentials
pub async fn check_auth<C: SheetsApi>(client: &C) -> Result<()> {
    log::info!("Verifying Google Sheets credentials...");
    client.verify().await?;
    log::info!("✓ Authentication succeeded");
    Ok(())
}

/// Run one export
///
/// Flow: TabExtractor → RosterTransformer → preview → CSV download (always) → optional
/// write-back. The CSV is saved to `output_dir` before the spreadsheet is written to.
pub async fn export<C: SheetsApi>(client: &C, request: &ExportRequest) -> Result<ExportReport> {
    request.validate()?;
    // Only a forced layout can clash with the destination
    if let Some(variant) = request.variant.forced() {
        request.destination.check(variant)?;
    }
    client.verify().await?;

    log::info!(
        "Reading {} / {}",
        request.spreadsheet.bright_black(),
        request.source_tab.bright_black()
    );
    let extractor = TabExtractor::new(client, &request.spreadsheet, &request.source_tab);
    let rows = extractor.extract().await?;

    let variant = request.variant.resolve(&request.destination, &rows);
    log::info!("Using the {} roster layout", variant.cyan());

    let transformer = RosterTransformer::new(variant.mapping(), request.constants());
    let records = transformer.transform_many(rows)?;
    log::info!("Transformed {} record(s)", records.len());

    for line in preview_table(&records, PREVIEW_ROWS) {
        log::info!("  {}", line);
    }

    let writer = request
        .destination
        .writer(client, &request.spreadsheet, &request.source_tab);
    let router = SinkRouter::new(
        CsvDownload::new(&request.course, &request.group),
        &request.output_dir,
        writer,
    );
    let count = records.len();
    let outcome = router.route(records).await?;

    Ok(ExportReport {
        variant,
        records: count,
        csv_path: outcome.csv_path,
        write_back: outcome.write_back,
    })
}
