pub mod admin;
pub mod config;
pub mod help;
pub mod log;
pub mod payout;
pub mod reports;

use crate::bot::{Context, Error};
use crate::sheets::models::LogRow;
use crate::sheets::queries;
use crate::utils::format::create_error_embed;

/// Fetches all logs, replying with an error embed when the spreadsheet cannot be read.
pub(crate) async fn fetch_rows_or_reply(ctx: Context<'_>) -> Result<Option<Vec<LogRow>>, Error> {
    match queries::fetch_log_rows(&ctx.data().sheets).await {
        Ok(rows) => Ok(Some(rows)),
        Err(e) => {
            tracing::error!("Failed to read logs for /{}: {:?}", ctx.command().name, e);
            let embed = create_error_embed("❌ Error", &format!("Could not read the spreadsheet: {}", e));
            ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await?;
            Ok(None)
        }
    }
}
