use crate::sheets::client::SheetsClient;
use anyhow::Result;
use serde_json::{Value, json};
use tracing::info;

pub const LOGS_TAB: &str = "Logs";
pub const PAYOUTS_TAB: &str = "Payouts";
pub const ARCHIVE_TAB: &str = "Archive";

pub const LOGS_DATA_RANGE: &str = "Logs!A2:H";
pub const LOGS_COUNT_RANGE: &str = "Logs!A2:A";
pub const LOGS_APPEND_RANGE: &str = "Logs!A:H";
pub const PAYOUTS_APPEND_RANGE: &str = "Payouts!A:H";
pub const ARCHIVE_APPEND_RANGE: &str = "Archive!A:I";

pub const LOG_HEADERS: [&str; 8] = [
    "Timestamp",
    "Week",
    "Username",
    "User ID",
    "Action",
    "Description",
    "Amount",
    "Image URL",
];

pub const PAYOUT_HEADERS: [&str; 8] = [
    "Timestamp",
    "Week",
    "Username",
    "User ID",
    "Amount",
    "Log count",
    "Status",
    "Admin",
];

pub const ARCHIVE_HEADERS: [&str; 9] = [
    "Timestamp",
    "Week",
    "Username",
    "User ID",
    "Action",
    "Description",
    "Amount",
    "Image URL",
    "Archived at",
];

pub struct TabLayout {
    pub title: &'static str,
    pub header_range: &'static str,
    pub headers: &'static [&'static str],
}

pub static TABS: [TabLayout; 3] = [
    TabLayout {
        title: LOGS_TAB,
        header_range: "Logs!A1:H1",
        headers: &LOG_HEADERS,
    },
    TabLayout {
        title: PAYOUTS_TAB,
        header_range: "Payouts!A1:H1",
        headers: &PAYOUT_HEADERS,
    },
    TabLayout {
        title: ARCHIVE_TAB,
        header_range: "Archive!A1:I1",
        headers: &ARCHIVE_HEADERS,
    },
];

/// Creates missing tabs and writes their header rows. Returns the titles that were created.
pub async fn setup_tabs(client: &SheetsClient) -> Result<Vec<String>> {
    info!("Initializing spreadsheet tabs...");

    let existing = client.sheet_ids().await?;
    let missing: Vec<&TabLayout> = TABS
        .iter()
        .filter(|tab| !existing.contains_key(tab.title))
        .collect();

    let requests: Vec<Value> = missing
        .iter()
        .map(|tab| json!({ "addSheet": { "properties": { "title": tab.title } } }))
        .collect();
    client.batch_update(requests).await?;

    for tab in &TABS {
        let header: Vec<Value> = tab.headers.iter().map(|h| json!(h)).collect();
        client.update_values(tab.header_range, vec![header]).await?;
    }

    info!("Spreadsheet initialized ({} tab(s) created)", missing.len());
    Ok(missing.iter().map(|tab| tab.title.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::client::tests::test_client;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn creates_only_missing_tabs_and_writes_headers() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet-123");
            then.status(200).json_body(serde_json::json!({
                "sheets": [{ "properties": { "sheetId": 0, "title": "Logs" } }]
            }));
        });
        let add_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v4/spreadsheets/sheet-123:batchUpdate")
                .json_body(serde_json::json!({
                    "requests": [
                        { "addSheet": { "properties": { "title": "Payouts" } } },
                        { "addSheet": { "properties": { "title": "Archive" } } }
                    ]
                }));
            then.status(200).json_body(serde_json::json!({}));
        });
        let archive_header = server.mock(|when, then| {
            when.method(PUT)
                .path("/v4/spreadsheets/sheet-123/values/Archive!A1:I1")
                .body_contains("Archived at");
            then.status(200).json_body(serde_json::json!({}));
        });
        let other_headers = server.mock(|when, then| {
            when.method(PUT).path_contains("A1:H1");
            then.status(200).json_body(serde_json::json!({}));
        });

        let created = setup_tabs(&test_client(&server)).await.unwrap();

        assert_eq!(created, vec!["Payouts".to_string(), "Archive".to_string()]);
        add_mock.assert();
        archive_header.assert();
        other_headers.assert_hits(2);
    }
}
