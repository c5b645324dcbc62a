use crate::bot::commands::fetch_rows_or_reply;
use crate::bot::interactions::payout_flow::{confirm_components, panel_components};
use crate::bot::{Context, Error};
use crate::utils::earnings::{member_earnings, weekly_earnings};
use crate::utils::format::{create_info_embed, payout_confirm_embed, payout_panel_embed};
use crate::utils::time::current_week_key;
use poise::serenity_prelude as serenity;

/// Open the interactive payout panel for the current week
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    check = "crate::bot::checks::has_payout_permission"
)]
pub async fn panel(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let Some(rows) = fetch_rows_or_reply(ctx).await? else {
        return Ok(());
    };
    let week = current_week_key();
    let members = weekly_earnings(&rows, &week);

    let reply = poise::CreateReply::default()
        .embed(payout_panel_embed(&week, &members))
        .components(panel_components(&week, &members));
    ctx.send(reply).await?;
    Ok(())
}

/// Pay out one member's earnings for the current week
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    check = "crate::bot::checks::has_payout_permission"
)]
pub async fn payout(
    ctx: Context<'_>,
    #[description = "The member to pay out"] member: serenity::User,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let Some(rows) = fetch_rows_or_reply(ctx).await? else {
        return Ok(());
    };
    let week = current_week_key();
    let earnings = member_earnings(&rows, &member.id.to_string(), &week);

    if earnings.rows.is_empty() {
        let embed = create_info_embed(
            "💎 Payout",
            &format!("<@{}> has no open earnings in {}.", member.id, week),
        );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    let reply = poise::CreateReply::default()
        .embed(payout_confirm_embed(&earnings))
        .components(confirm_components(member.id.get(), &week));
    ctx.send(reply).await?;
    Ok(())
}
