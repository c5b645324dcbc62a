use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub spreadsheet_id: String,
    pub log_output_channel_id: Option<u64>,
    pub report_channel_id: Option<u64>,
    pub google_credentials_base64: Option<String>,
    pub google_credentials_file: String,
    pub payout_role_ids: Vec<u64>,
    pub config_file: String,
    pub sheets_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN environment variable is required"))?;

        let spreadsheet_id = env::var("SPREADSHEET_ID")
            .map_err(|_| anyhow::anyhow!("SPREADSHEET_ID environment variable is required"))?;

        let log_output_channel_id =
            parse_optional_id("LOG_OUTPUT_CHANNEL_ID", env::var("LOG_OUTPUT_CHANNEL_ID").ok())?;
        let report_channel_id =
            parse_optional_id("REPORT_CHANNEL_ID", env::var("REPORT_CHANNEL_ID").ok())?;

        let google_credentials_base64 = env::var("GOOGLE_CREDENTIALS_BASE64")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let google_credentials_file =
            env::var("GOOGLE_CREDENTIALS_FILE").unwrap_or_else(|_| "credentials.json".to_string());

        let payout_role_ids = parse_id_list(&env::var("PAYOUT_ROLE_IDS").unwrap_or_default());

        let config_file = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string());
        let sheets_api_base = env::var("SHEETS_API_BASE")
            .unwrap_or_else(|_| crate::sheets::client::DEFAULT_API_BASE.to_string());

        Ok(Config {
            discord_token,
            spreadsheet_id,
            log_output_channel_id,
            report_channel_id,
            google_credentials_base64,
            google_credentials_file,
            payout_role_ids,
            config_file,
            sheets_api_base,
        })
    }
}

/// Comma separated snowflakes; entries that are not numbers are skipped.
pub fn parse_id_list(value: &str) -> Vec<u64> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| match part.parse::<u64>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                tracing::warn!("Ignoring invalid role id {:?}", part);
                None
            }
        })
        .collect()
}

pub fn parse_optional_id(name: &str, value: Option<String>) -> Result<Option<u64>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<u64>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(anyhow::anyhow!("{} must be a numeric channel id, got {:?}", name, raw)),
        },
    }
}
