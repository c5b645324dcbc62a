use crate::bot::interactions::admin_flow::purge_confirm_components;
use crate::bot::{Context, Error};
use crate::sheets::{layout, queries};
use crate::utils::format::{
    create_error_embed, create_info_embed, create_success_embed, purge_confirm_embed,
};
use crate::utils::time::{get_current_datetime, parse_date_string};
use poise::serenity_prelude as serenity;

/// Download every log as a CSV file
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    default_member_permissions = "ADMINISTRATOR",
    required_permissions = "ADMINISTRATOR"
)]
pub async fn backup(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let (count, csv) = match queries::export_csv(&ctx.data().sheets).await {
        Ok(export) => export,
        Err(e) => {
            tracing::error!("CSV backup failed: {:?}", e);
            let embed = create_error_embed("❌ Error", &format!("Backup failed: {}", e));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }
    };

    let filename = format!(
        "backup_{}.csv",
        get_current_datetime().format("%Y%m%d_%H%M%S")
    );
    tracing::info!("{} requested backup {} ({} logs)", ctx.author().name, filename, count);

    let reply = poise::CreateReply::default()
        .embed(create_success_embed(
            "💾 Backup created",
            &format!("**{}** log(s) exported.", count),
        ))
        .attachment(serenity::CreateAttachment::bytes(csv, filename));
    ctx.send(reply).await?;
    Ok(())
}

/// Delete logs submitted before a date
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    default_member_permissions = "ADMINISTRATOR",
    required_permissions = "ADMINISTRATOR"
)]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "Delete logs before this date (DD.MM.YYYY)"] before: String,
) -> Result<(), Error> {
    let cutoff = match parse_date_string(&before) {
        Ok(date) => date,
        Err(e) => {
            let embed = create_error_embed("❌ Invalid date", &e.to_string());
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }
    };

    ctx.defer_ephemeral().await?;
    let values = match queries::fetch_log_values(&ctx.data().sheets).await {
        Ok(values) => values,
        Err(e) => {
            tracing::error!("Failed to read logs for /purge: {:?}", e);
            let embed = create_error_embed("❌ Error", &format!("Could not read the spreadsheet: {}", e));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }
    };

    let count = queries::rows_before(&values, cutoff).len();
    if count == 0 {
        let embed = create_info_embed(
            "🗑️ Delete old logs",
            &format!("No logs before {}.", before.trim()),
        );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    let reply = poise::CreateReply::default()
        .embed(purge_confirm_embed(cutoff, count))
        .components(purge_confirm_components(cutoff));
    ctx.send(reply).await?;
    Ok(())
}

/// Create the spreadsheet tabs and headers (run once)
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    default_member_permissions = "ADMINISTRATOR",
    required_permissions = "ADMINISTRATOR"
)]
pub async fn setup(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let embed = match layout::setup_tabs(&ctx.data().sheets).await {
        Ok(created) => {
            let created = if created.is_empty() {
                "All tabs already existed.".to_string()
            } else {
                format!("Created: {}", created.join(", "))
            };
            create_success_embed(
                "✅ Spreadsheet ready",
                &format!("📋 Tabs: Logs, Payouts, Archive\n{}", created),
            )
        }
        Err(e) => {
            tracing::error!("Spreadsheet setup failed: {:?}", e);
            create_error_embed("❌ Error", &format!("Setup failed: {}", e))
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
