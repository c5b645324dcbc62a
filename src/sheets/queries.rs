use crate::sheets::client::SheetsClient;
use crate::sheets::layout::{
    ARCHIVE_APPEND_RANGE, LOG_HEADERS, LOGS_APPEND_RANGE, LOGS_COUNT_RANGE, LOGS_DATA_RANGE,
    LOGS_TAB, PAYOUTS_APPEND_RANGE,
};
use crate::sheets::models::{ActionType, LogEntry, LogRow, PayoutRecord};
use crate::utils::earnings::{FIRST_DATA_ROW, deletion_ranges, parse_log_rows};
use crate::utils::time::{format_timestamp, parse_timestamp, week_key};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Value, json};

// Log queries
/// Raw cells of every `Logs` data row, including rows that do not parse as a log.
pub async fn fetch_log_values(client: &SheetsClient) -> Result<Vec<Vec<String>>> {
    client
        .get_values(LOGS_DATA_RANGE)
        .await
        .context("failed to fetch logs")
}

pub async fn fetch_log_rows(client: &SheetsClient) -> Result<Vec<LogRow>> {
    let values = fetch_log_values(client).await?;
    Ok(parse_log_rows(&values))
}

pub async fn total_log_count(client: &SheetsClient) -> Result<usize> {
    let values = client
        .get_values(LOGS_COUNT_RANGE)
        .await
        .context("failed to count logs")?;
    Ok(values.len())
}

pub async fn save_log(
    client: &SheetsClient,
    username: &str,
    user_id: &str,
    action: ActionType,
    description: &str,
    image_url: &str,
    now: NaiveDateTime,
) -> Result<LogEntry> {
    let entry = LogEntry {
        timestamp: format_timestamp(now),
        week: week_key(now.date()),
        username: username.to_string(),
        user_id: user_id.to_string(),
        action: action.label().to_string(),
        description: description.to_string(),
        amount_cents: action.amount_cents(),
        image_url: image_url.to_string(),
    };

    client
        .append_values(LOGS_APPEND_RANGE, vec![entry.to_row()])
        .await
        .context("failed to save log")?;

    tracing::info!("Log saved: {} - {}", username, action.label());
    Ok(entry)
}

// Payout queries
pub async fn save_payout(client: &SheetsClient, record: &PayoutRecord) -> Result<()> {
    client
        .append_values(PAYOUTS_APPEND_RANGE, vec![record.to_row()])
        .await
        .context("failed to save payout")?;

    tracing::info!(
        "Payout saved: {} - {} cents ({})",
        record.username,
        record.amount_cents,
        record.week
    );
    Ok(())
}

fn delete_rows_requests(sheet_id: i64, row_numbers: &[usize]) -> Vec<Value> {
    deletion_ranges(row_numbers)
        .into_iter()
        .map(|(start, end)| {
            json!({
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start - 1,
                        "endIndex": end - 1
                    }
                }
            })
        })
        .collect()
}

pub async fn delete_log_rows(client: &SheetsClient, row_numbers: &[usize]) -> Result<()> {
    if row_numbers.is_empty() {
        return Ok(());
    }
    let sheet_id = client
        .sheet_id(LOGS_TAB)
        .await
        .context("failed to resolve the Logs tab")?;
    client
        .batch_update(delete_rows_requests(sheet_id, row_numbers))
        .await
        .context("failed to delete log rows")?;
    Ok(())
}

/// Copies the rows to the archive tab, then removes them from `Logs`.
pub async fn archive_rows(client: &SheetsClient, rows: &[LogRow], now: NaiveDateTime) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    let archived_at = format_timestamp(now);
    let archive: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| row.entry.to_archive_row(&archived_at))
        .collect();

    client
        .append_values(ARCHIVE_APPEND_RANGE, archive)
        .await
        .context("failed to copy logs to the archive")?;

    let row_numbers: Vec<usize> = rows.iter().map(|row| row.row_number).collect();
    delete_log_rows(client, &row_numbers).await?;

    tracing::info!("{} log(s) archived", rows.len());
    Ok(rows.len())
}

/// Sheet rows logged strictly before `cutoff`, judged on the timestamp cell alone.
/// Rows with an unreadable timestamp are never selected.
pub fn rows_before(values: &[Vec<String>], cutoff: NaiveDate) -> Vec<usize> {
    let cutoff = cutoff.and_time(NaiveTime::MIN);
    values
        .iter()
        .enumerate()
        .filter(|(_, cells)| {
            cells
                .first()
                .and_then(|timestamp| parse_timestamp(timestamp))
                .is_some_and(|ts| ts < cutoff)
        })
        .map(|(index, _)| index + FIRST_DATA_ROW)
        .collect()
}

pub async fn delete_logs_before(client: &SheetsClient, cutoff: NaiveDate) -> Result<usize> {
    let values = fetch_log_values(client).await?;
    let doomed = rows_before(&values, cutoff);
    delete_log_rows(client, &doomed).await?;

    tracing::info!("Deleted {} log(s) before {}", doomed.len(), cutoff);
    Ok(doomed.len())
}

pub fn logs_to_csv(rows: &[LogRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(LOG_HEADERS)?;
    for row in rows {
        writer.write_record(row.entry.to_csv_record())?;
    }
    writer.into_inner().context("failed to finish CSV export")
}

pub async fn export_csv(client: &SheetsClient) -> Result<(usize, Vec<u8>)> {
    let rows = fetch_log_rows(client).await?;
    let csv = logs_to_csv(&rows)?;
    Ok((rows.len(), csv))
}
