use crate::sheets::auth::TokenProvider;
use crate::sheets::error::{Result, SheetsError};
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Thin wrapper over the Sheets v4 REST API for one spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    auth: Arc<dyn TokenProvider>,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        spreadsheet_id: &str,
        auth: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            auth,
        }
    }

    fn url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::ApiError {
                status: 0,
                message: format!("base URL cannot hold a path: {}", self.base_url),
            })?
            .pop_if_empty()
            .push("v4")
            .push("spreadsheets")
            .extend(tail);
        Ok(url)
    }

    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        self.url(&[&self.spreadsheet_id, "values", &format!("{}{}", range, suffix)])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(SheetsError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(range, "")?;
        tracing::debug!("Fetching range {}", range);
        let value_range: ValueRange = self.send(self.http.get(url)).await?;
        Ok(value_range.values)
    }

    pub async fn append_values(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<()> {
        let url = self.values_url(range, ":append")?;
        tracing::debug!("Appending {} row(s) to {}", rows.len(), range);
        let request = self
            .http
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": rows }));
        let _: Value = self.send(request).await?;
        Ok(())
    }

    pub async fn update_values(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<()> {
        let url = self.values_url(range, "")?;
        tracing::debug!("Updating range {}", range);
        let request = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": rows }));
        let _: Value = self.send(request).await?;
        Ok(())
    }

    /// Tab title to numeric sheet id.
    pub async fn sheet_ids(&self) -> Result<HashMap<String, i64>> {
        let url = self.url(&[&self.spreadsheet_id])?;
        let request = self.http.get(url).query(&[("fields", "sheets.properties")]);
        let spreadsheet: Spreadsheet = self.send(request).await?;

        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| (sheet.properties.title, sheet.properties.sheet_id))
            .collect())
    }

    pub async fn sheet_id(&self, title: &str) -> Result<i64> {
        self.sheet_ids()
            .await?
            .get(title)
            .copied()
            .ok_or_else(|| SheetsError::TabNotFound(title.to_string()))
    }

    pub async fn batch_update(&self, requests: Vec<Value>) -> Result<()> {
        if requests.is_empty() {
            return Ok(());
        }
        let url = self.url(&[&format!("{}:batchUpdate", self.spreadsheet_id)])?;
        tracing::debug!("Sending batchUpdate with {} request(s)", requests.len());
        let request = self.http.post(url).json(&json!({ "requests": requests }));
        let _: Value = self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sheets::auth::tests::StaticToken;
    use httpmock::prelude::*;

    pub(crate) const SPREADSHEET: &str = "sheet-123";

    pub(crate) fn test_client(server: &MockServer) -> SheetsClient {
        SheetsClient::new(
            reqwest::Client::new(),
            &server.base_url(),
            SPREADSHEET,
            Arc::new(StaticToken("test-token")),
        )
    }

    #[tokio::test]
    async fn get_values_sends_bearer_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-123/values/Logs!A2:H")
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(serde_json::json!({
                "range": "Logs!A2:H1000",
                "majorDimension": "ROWS",
                "values": [["a", "b"], [], ["c"]]
            }));
        });

        let values = test_client(&server).get_values("Logs!A2:H").await.unwrap();
        mock.assert();
        assert_eq!(values.len(), 3);
        assert!(values[1].is_empty());
    }

    #[tokio::test]
    async fn empty_range_has_no_values() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123/values/Logs!A2:H");
            then.status(200)
                .json_body(serde_json::json!({ "range": "Logs!A2:H1000", "majorDimension": "ROWS" }));
        });

        let values = test_client(&server).get_values("Logs!A2:H").await.unwrap();
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn append_uses_raw_input() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v4/spreadsheets/sheet-123/values/Payouts!A:H:append")
                .query_param("valueInputOption", "RAW")
                .query_param("insertDataOption", "INSERT_ROWS")
                .json_body(serde_json::json!({ "values": [["x", 1.5]] }));
            then.status(200).json_body(serde_json::json!({ "spreadsheetId": SPREADSHEET }));
        });

        test_client(&server)
            .append_values("Payouts!A:H", vec![vec![json!("x"), json!(1.5)]])
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn api_errors_carry_google_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123/values/Missing!A:A");
            then.status(400).json_body(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "Unable to parse range: Missing!A:A",
                    "status": "INVALID_ARGUMENT"
                }
            }));
        });

        let err = test_client(&server).get_values("Missing!A:A").await.unwrap_err();
        match err {
            SheetsError::ApiError { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Unable to parse range: Missing!A:A");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolves_sheet_ids_by_title() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet-123")
                .query_param("fields", "sheets.properties");
            then.status(200).json_body(serde_json::json!({
                "sheets": [
                    { "properties": { "sheetId": 0, "title": "Logs", "index": 0 } },
                    { "properties": { "sheetId": 77, "title": "Archive", "index": 1 } }
                ]
            }));
        });

        let client = test_client(&server);
        assert_eq!(client.sheet_id("Archive").await.unwrap(), 77);
        assert!(matches!(
            client.sheet_id("Payouts").await,
            Err(SheetsError::TabNotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_batch_update_is_skipped() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v4/spreadsheets/sheet-123:batchUpdate");
            then.status(200).json_body(serde_json::json!({}));
        });

        test_client(&server).batch_update(vec![]).await.unwrap();
        mock.assert_hits(0);
    }
}
