use crate::bot::commands::fetch_rows_or_reply;
use crate::bot::{Context, Error};
use crate::sheets::client::SheetsClient;
use crate::sheets::queries;
use crate::utils::earnings::{member_history, overall_stats, weekly_summary};
use crate::utils::format::{
    create_info_embed, member_stats_embed, overall_stats_embed, weekly_report_embed,
};
use crate::utils::time::current_week_key;
use poise::serenity_prelude as serenity;

const TOP_MEMBERS: usize = 10;

pub async fn build_weekly_report(sheets: &SheetsClient) -> anyhow::Result<serenity::CreateEmbed> {
    let rows = queries::fetch_log_rows(sheets).await?;
    let summary = weekly_summary(&rows, &current_week_key());
    Ok(weekly_report_embed(&summary))
}

/// Show this week's report
#[poise::command(
    slash_command,
    guild_only,
    check = "crate::bot::checks::has_payout_permission"
)]
pub async fn weekly_report(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let Some(rows) = fetch_rows_or_reply(ctx).await? else {
        return Ok(());
    };
    let summary = weekly_summary(&rows, &current_week_key());

    ctx.send(poise::CreateReply::default().embed(weekly_report_embed(&summary)))
        .await?;
    Ok(())
}

/// All-time statistics over every open log
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    check = "crate::bot::checks::has_payout_permission"
)]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let Some(rows) = fetch_rows_or_reply(ctx).await? else {
        return Ok(());
    };
    let stats = overall_stats(&rows, TOP_MEMBERS);

    ctx.send(poise::CreateReply::default().embed(overall_stats_embed(&stats)))
        .await?;
    Ok(())
}

/// All-time statistics of one member
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    check = "crate::bot::checks::has_payout_permission"
)]
pub async fn member_stats(
    ctx: Context<'_>,
    #[description = "The member to look up"] user: serenity::User,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let Some(rows) = fetch_rows_or_reply(ctx).await? else {
        return Ok(());
    };

    let embed = match member_history(&rows, &user.name) {
        Some(history) => member_stats_embed(&history),
        None => create_info_embed(
            "👤 Member statistics",
            &format!("No logs found for **{}**.", user.name),
        ),
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
