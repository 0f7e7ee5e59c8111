//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::{service_account, Sheet};
use crate::{ImportConfig, Result};
use anyhow::{bail, Context};
use serde_json::{json, Value};
use sheets::types::BatchClearValuesRequest;
use sheets::ClientError;
use tracing::trace;
use url::Url;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Implements the `Sheet` trait against the Google Sheets API, authenticated as a service
/// account. The access token is obtained once in `new` and used for the whole run.
pub(crate) struct GoogleSheet {
    spreadsheet_id: String,
    access_token: String,
    client: sheets::Client,
    http: reqwest::Client,
}

impl GoogleSheet {
    pub(crate) async fn new(config: &ImportConfig) -> Result<Self> {
        let access_token = service_account::access_token(config.service_account_path()).await?;
        Ok(Self {
            spreadsheet_id: config.spreadsheet_id().to_string(),
            client: create_sheets_client(&access_token),
            access_token,
            http: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn clear_ranges(&mut self, ranges: &[&str]) -> Result<()> {
        trace!("clear_ranges {ranges:?}");
        let request = BatchClearValuesRequest {
            ranges: ranges.iter().map(|s| s.to_string()).collect(),
        };
        self.client
            .spreadsheets()
            .values_batch_clear(&self.spreadsheet_id, &request)
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to clear ranges: {:?}", ranges))?;
        Ok(())
    }

    async fn append_rows(&mut self, range: &str, rows: &[Vec<Value>]) -> Result<()> {
        trace!("append_rows {} rows to {range}", rows.len());

        // The `sheets` crate models cell values as strings, so amounts would arrive in the sheet
        // as text. The append endpoint is called directly to send them as numbers.
        let url = append_url(&self.spreadsheet_id, range)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .send()
            .await
            .with_context(|| format!("Failed to send append request for {range}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("Google Sheets API append to {range} failed with status {status}: {body}");
        }
        Ok(())
    }
}

/// `POST {SHEETS_API}/{id}/values/{range}:append` with new rows inserted rather than written over
/// whatever follows the table.
fn append_url(spreadsheet_id: &str, range: &str) -> Result<Url> {
    let method = format!("{range}:append");
    let mut url = Url::parse(SHEETS_API).context("Invalid Sheets API URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("The Sheets API URL cannot hold a path"))?
        .extend([spreadsheet_id, "values", method.as_str()]);
    url.query_pairs_mut()
        .append_pair("valueInputOption", "USER_ENTERED")
        .append_pair("insertDataOption", "INSERT_ROWS");
    Ok(url)
}

/// Creates a sheets client that uses `access_token` for every request.
fn create_sheets_client(access_token: &str) -> sheets::Client {
    // Note: The sheets crate requires client_id, client_secret, and redirect_uri,
    // but we don't need them for API calls, only the access token
    sheets::Client::new(
        String::new(), // client_id (not needed for API calls with access token)
        String::new(), // client_secret (not needed for API calls with access token)
        String::new(), // redirect_uri (not needed for API calls with access token)
        access_token.to_string(),
        String::new(), // refresh_token (service account tokens are not refreshed)
    )
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_url() {
        let url = append_url("abc123", "Expenses!A1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Expenses!A1:append\
             ?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS"
        );
    }

    #[test]
    fn test_append_url_encodes_sheet_name() {
        let url = append_url("abc123", "My Incomes!A1").unwrap();
        assert!(url.path().ends_with("/values/My%20Incomes!A1:append"));
    }
}
