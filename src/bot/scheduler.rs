use crate::bot::commands::reports::build_weekly_report;
use crate::sheets::client::SheetsClient;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

pub const WEEKLY_REPORT_INTERVAL: Duration = Duration::from_secs(168 * 60 * 60);

/// Posts the weekly report right away and then once every 168 hours.
pub fn spawn_weekly_report(
    http: Arc<serenity::Http>,
    sheets: Arc<SheetsClient>,
    channel_id: serenity::ChannelId,
) {
    tracing::info!("Weekly report scheduled for channel {}", channel_id);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(WEEKLY_REPORT_INTERVAL);
        loop {
            interval.tick().await;

            let embed = match build_weekly_report(&sheets).await {
                Ok(embed) => embed,
                Err(e) => {
                    tracing::error!("Failed to build weekly report: {:?}", e);
                    continue;
                }
            };

            match channel_id
                .send_message(&http, serenity::CreateMessage::new().embed(embed))
                .await
            {
                Ok(_) => tracing::info!("Weekly report posted"),
                Err(e) => tracing::error!("Failed to post weekly report: {:?}", e),
            }
        }
    });
}
