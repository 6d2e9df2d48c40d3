//! Google Sheets client
//!
//! Resolves spreadsheet names through the Drive v3 files API and reads/writes values
//! through the Sheets v4 API.

use super::sheets::a1_range;
use super::{Auth, SheetsApi, Spreadsheet, Tab};
use crate::error::RosterError;
use eyre::{Context, Result, eyre};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Default base URL of the Sheets API
pub const SHEETS_URL: &str = "https://sheets.googleapis.com/";
/// Default base URL of the Drive API
pub const DRIVE_URL: &str = "https://www.googleapis.com/";

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Google Sheets client authenticated with an OAuth bearer token.
///
/// # Example
/// ```no_run
/// use moodle_roster::client::{Auth, GoogleSheets, SheetsApi};
///
/// # async fn example() -> eyre::Result<()> {
/// let client = GoogleSheets::try_new(Auth::from_env())?;
/// client.verify().await?;
/// let spreadsheet = client.open("CARGAS_MOODLE_LEGADO").await?;
/// let rows = client.values(&spreadsheet, "Turma A").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct GoogleSheets {
    client: Client,
    sheets_url: Url,
    drive_url: Url,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl GoogleSheets {
    /// Create a client against the public Google endpoints.
    ///
    /// # Errors
    /// Returns [`RosterError::AuthenticationFailure`] when `auth` carries no credentials,
    /// or an error if the HTTP client cannot be built.
    pub fn try_new(auth: Auth) -> Result<Self> {
        Self::from_builder(auth, Client::builder())
    }

    fn from_builder(auth: Auth, builder: ClientBuilder) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            auth.header_value()?.parse()?,
        );
        let client = builder.default_headers(headers).build()?;

        Ok(Self {
            client,
            sheets_url: Url::parse(SHEETS_URL)?,
            drive_url: Url::parse(DRIVE_URL)?,
        })
    }

    /// Point the client at different API hosts (proxies, emulators).
    pub fn with_base_urls(mut self, sheets_url: Url, drive_url: Url) -> Self {
        self.sheets_url = sheets_url;
        self.drive_url = drive_url;
        self
    }

    pub fn sheets_url(&self) -> &Url {
        &self.sheets_url
    }

    pub fn drive_url(&self) -> &Url {
        &self.drive_url
    }

    /// Append percent-encoded path segments to a base URL.
    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| eyre!("Base URL cannot hold a path: {}", base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn spreadsheet_endpoint(&self, id: &str, rest: &[&str]) -> Result<Url> {
        let mut segments = vec!["v4", "spreadsheets", id];
        segments.extend_from_slice(rest);
        Self::endpoint(&self.sheets_url, &segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        log::debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// Send a request and turn HTTP failures into errors.
    async fn send(request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request to {}: {}", action, e))?;
        Self::check(response, action).await
    }

    /// 401 and 403 become [`RosterError::AuthenticationFailure`].
    async fn check(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RosterError::AuthenticationFailure {
                reason: format!("{} ({}): {}", action, status, body),
            }
            .into());
        }
        eyre::bail!("Failed to {} ({}): {}", action, status, body)
    }

    async fn batch_update(&self, spreadsheet: &Spreadsheet, requests: Value) -> Result<Value> {
        let batch = format!("{}:batchUpdate", spreadsheet.id);
        let url = Self::endpoint(&self.sheets_url, &["v4", "spreadsheets", &batch])?;
        let response = Self::send(
            self.request(Method::POST, url)
                .json(&json!({ "requests": requests })),
            "update spreadsheet",
        )
        .await?;
        response
            .json()
            .await
            .with_context(|| "Failed to parse batchUpdate response")
    }

    async fn resize(
        &self,
        spreadsheet: &Spreadsheet,
        tab: &Tab,
        rows: usize,
        cols: usize,
    ) -> Result<()> {
        log::debug!("Resizing tab '{}' to {}x{}", tab.title, rows, cols);
        self.batch_update(
            spreadsheet,
            json!([{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": tab.id,
                        "gridProperties": { "rowCount": rows.max(1), "columnCount": cols.max(1) }
                    },
                    "fields": "gridProperties(rowCount,columnCount)"
                }
            }]),
        )
        .await?;
        Ok(())
    }

    /// Drive query matching a spreadsheet by exact name.
    fn name_query(name: &str) -> String {
        let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
        format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escaped, SPREADSHEET_MIME
        )
    }
}

impl SheetsApi for GoogleSheets {
    async fn verify(&self) -> Result<()> {
        let url = Self::endpoint(&self.drive_url, &["drive", "v3", "about"])?;
        Self::send(
            self.request(Method::GET, url).query(&[("fields", "user")]),
            "verify credentials",
        )
        .await?;
        Ok(())
    }

    async fn open(&self, name: &str) -> Result<Spreadsheet> {
        let url = Self::endpoint(&self.drive_url, &["drive", "v3", "files"])?;
        let query = Self::name_query(name);
        let response = Self::send(
            self.request(Method::GET, url).query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ]),
            "search spreadsheets",
        )
        .await?;
        let list: FileList = response
            .json()
            .await
            .with_context(|| "Failed to parse Drive file list")?;

        let file = list
            .files
            .into_iter()
            .next()
            .ok_or_else(|| RosterError::SpreadsheetNotFound {
                name: name.to_string(),
            })?;
        log::debug!("Spreadsheet '{}' resolved to {}", file.name, file.id);

        let url = self.spreadsheet_endpoint(&file.id, &[])?;
        let response = self
            .request(Method::GET, url)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request to open spreadsheet: {}", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RosterError::SpreadsheetNotFound {
                name: name.to_string(),
            }
            .into());
        }
        let response = Self::check(response, "open spreadsheet").await?;
        let meta: SpreadsheetMeta = response
            .json()
            .await
            .with_context(|| "Failed to parse spreadsheet metadata")?;

        Ok(Spreadsheet {
            id: file.id,
            name: file.name,
            tabs: meta
                .sheets
                .into_iter()
                .map(|s| Tab {
                    id: s.properties.sheet_id,
                    title: s.properties.title,
                })
                .collect(),
        })
    }

    async fn values(&self, spreadsheet: &Spreadsheet, tab: &str) -> Result<Vec<Vec<Value>>> {
        let url = self.spreadsheet_endpoint(&spreadsheet.id, &["values", &a1_range(tab)])?;
        let response = Self::send(
            self.request(Method::GET, url).query(&[
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("majorDimension", "ROWS"),
            ]),
            "read tab values",
        )
        .await?;
        let range: ValueRange = response
            .json()
            .await
            .with_context(|| format!("Failed to parse values of tab '{}'", tab))?;
        Ok(range.values)
    }

    async fn clear(&self, spreadsheet: &Spreadsheet, tab: &Tab) -> Result<()> {
        let clear = format!("{}:clear", a1_range(&tab.title));
        let url = self.spreadsheet_endpoint(&spreadsheet.id, &["values", &clear])?;
        Self::send(
            self.request(Method::POST, url).json(&json!({})),
            "clear tab",
        )
        .await?;
        Ok(())
    }

    async fn add_tab(
        &self,
        spreadsheet: &Spreadsheet,
        title: &str,
        rows: usize,
        cols: usize,
    ) -> Result<Tab> {
        let reply = self
            .batch_update(
                spreadsheet,
                json!([{
                    "addSheet": {
                        "properties": {
                            "title": title,
                            "gridProperties": { "rowCount": rows.max(1), "columnCount": cols.max(1) }
                        }
                    }
                }]),
            )
            .await?;

        let id = reply
            .pointer("/replies/0/addSheet/properties/sheetId")
            .and_then(Value::as_i64)
            .ok_or_else(|| eyre!("addSheet reply carried no sheetId"))?;
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
        let range = format!("{}!A1", a1_range(&tab.title));
        let url = self.spreadsheet_endpoint(&spreadsheet.id, &["values", &range])?;
        Self::send(
            self.request(Method::PUT, url)
                .query(&[("valueInputOption", "USER_ENTERED")])
                .json(&json!({
                    "range": range,
                    "majorDimension": "ROWS",
                    "values": rows,
                })),
            "write tab values",
        )
        .await?;

        if resize {
            let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
            self.resize(spreadsheet, tab, rows.len(), cols).await?;
        }
        Ok(())
    }
}
