pub mod auth;
pub mod client;
pub mod error;
pub mod layout;
pub mod models;
pub mod queries;

use crate::config::Config;
use anyhow::Result;
use auth::{ServiceAccountAuth, ServiceAccountKey};
use client::SheetsClient;
use std::sync::Arc;

pub fn create_client(config: &Config) -> Result<SheetsClient> {
    let key = ServiceAccountKey::load(
        config.google_credentials_base64.as_deref(),
        &config.google_credentials_file,
    )?;
    tracing::info!(
        "Authenticating to Google Sheets as {} (project {})",
        key.client_email,
        key.project_id.as_deref().unwrap_or("unknown")
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let auth = ServiceAccountAuth::new(key, http.clone())?;

    Ok(SheetsClient::new(
        http,
        &config.sheets_api_base,
        &config.spreadsheet_id,
        Arc::new(auth),
    ))
}
