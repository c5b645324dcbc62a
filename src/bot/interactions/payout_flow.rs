use crate::bot::interactions::custom_id::ComponentAction;
use crate::bot::interactions::{
    defer_ephemeral, edit_embed, followup_ephemeral, replace_message, reply_ephemeral,
};
use crate::bot::{Data, Error};
use crate::sheets::models::{LogRow, MemberEarnings};
use crate::sheets::queries;
use crate::utils::earnings::{member_earnings, weekly_earnings};
use crate::utils::format::{
    create_error_embed, create_info_embed, create_warning_embed, pay_all_confirm_embed,
    pay_all_progress_embed, pay_all_result_embed, payout_confirm_embed, payout_dm_embed,
    payout_done_embed, payout_panel_embed,
};
use crate::utils::member_selector::MemberSelector;
use crate::utils::payout_manager::PayoutOutcome;
use crate::utils::time::current_week_key;
use poise::serenity_prelude as serenity;

pub fn panel_components(week: &str, members: &[MemberEarnings]) -> Vec<serenity::CreateActionRow> {
    let selector = MemberSelector::new(members);
    let mut rows = Vec::new();

    let select_id = ComponentAction::PayoutSelect {
        week: week.to_string(),
    }
    .custom_id();
    if let Some(menu) = selector.create_select_menu(&select_id) {
        rows.push(serenity::CreateActionRow::SelectMenu(menu));
    }

    let pay_all = serenity::CreateButton::new(
        ComponentAction::PayAll {
            week: week.to_string(),
        }
        .custom_id(),
    )
    .label("💰 Pay everyone")
    .style(serenity::ButtonStyle::Success)
    .disabled(selector.is_empty());
    let refresh = serenity::CreateButton::new(ComponentAction::PanelRefresh.custom_id())
        .label("🔄 Refresh")
        .style(serenity::ButtonStyle::Secondary);
    let close = serenity::CreateButton::new(ComponentAction::PanelClose.custom_id())
        .label("❌ Close")
        .style(serenity::ButtonStyle::Danger);
    rows.push(serenity::CreateActionRow::Buttons(vec![pay_all, refresh, close]));

    rows
}

pub fn confirm_components(user_id: u64, week: &str) -> Vec<serenity::CreateActionRow> {
    let confirm = serenity::CreateButton::new(
        ComponentAction::PayoutConfirm {
            user_id,
            week: week.to_string(),
        }
        .custom_id(),
    )
    .label("✅ Pay out")
    .style(serenity::ButtonStyle::Success);
    let cancel = serenity::CreateButton::new(ComponentAction::PayoutCancel.custom_id())
        .label("❌ Cancel")
        .style(serenity::ButtonStyle::Secondary);

    vec![serenity::CreateActionRow::Buttons(vec![confirm, cancel])]
}

fn pay_all_components(week: &str) -> Vec<serenity::CreateActionRow> {
    let confirm = serenity::CreateButton::new(
        ComponentAction::PayAllConfirm {
            week: week.to_string(),
        }
        .custom_id(),
    )
    .label("✅ Pay everyone")
    .style(serenity::ButtonStyle::Success);
    let cancel = serenity::CreateButton::new(ComponentAction::PayAllCancel.custom_id())
        .label("❌ Cancel")
        .style(serenity::ButtonStyle::Secondary);

    vec![serenity::CreateActionRow::Buttons(vec![confirm, cancel])]
}

/// Loads `Logs` after a deferred response, reporting a failure to the clicker.
async fn fetch_rows(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<Option<Vec<LogRow>>, Error> {
    match queries::fetch_log_rows(&data.sheets).await {
        Ok(rows) => Ok(Some(rows)),
        Err(e) => {
            tracing::error!("Failed to load logs: {:?}", e);
            let embed = create_error_embed("❌ Error", "The spreadsheet could not be read.");
            followup_ephemeral(ctx, interaction, embed, vec![]).await?;
            Ok(None)
        }
    }
}

pub async fn member_selected(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    week: &str,
) -> Result<(), Error> {
    let selected = match &interaction.data.kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    };
    let Some(user_id) = selected.and_then(|value| value.parse::<u64>().ok()) else {
        return reply_ephemeral(
            ctx,
            interaction,
            create_error_embed("❌ Error", "Invalid selection."),
        )
        .await;
    };

    defer_ephemeral(ctx, interaction).await?;
    let Some(rows) = fetch_rows(ctx, interaction, data).await? else {
        return Ok(());
    };

    let earnings = member_earnings(&rows, &user_id.to_string(), week);
    if earnings.rows.is_empty() {
        let embed = create_info_embed(
            "💎 Payout",
            &format!("<@{}> has no open earnings in {}.", user_id, week),
        );
        return followup_ephemeral(ctx, interaction, embed, vec![]).await;
    }

    followup_ephemeral(
        ctx,
        interaction,
        payout_confirm_embed(&earnings),
        confirm_components(user_id, week),
    )
    .await
}

pub async fn confirm_payout(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    user_id: u64,
    week: &str,
) -> Result<(), Error> {
    let processing = create_info_embed("⏳ Processing payout...", "Recording the payout.");
    replace_message(ctx, interaction, processing).await?;

    let admin = &interaction.user.name;
    let embed = match data
        .payouts
        .pay_member(&user_id.to_string(), week, admin)
        .await
    {
        Ok(PayoutOutcome::Paid { earnings, archived }) => {
            tracing::info!(
                "{} paid out {} for {} ({} cents)",
                admin,
                earnings.username,
                week,
                earnings.total_cents
            );
            send_payout_dm(ctx, &earnings).await;
            payout_done_embed(&earnings, archived)
        }
        Ok(PayoutOutcome::NothingOwed) => create_warning_embed(
            "⚠️ Nothing to pay",
            &format!(
                "<@{}> has no open earnings in {}. The payout may already have been made.",
                user_id, week
            ),
        ),
        Err(e) => {
            tracing::error!("Payout to {} failed: {:?}", user_id, e);
            create_error_embed(
                "❌ Payout failed",
                "Nothing was paid out. Please try again.",
            )
        }
    };

    edit_embed(ctx, interaction, embed).await;
    Ok(())
}

pub async fn pay_all_prompt(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    week: &str,
) -> Result<(), Error> {
    defer_ephemeral(ctx, interaction).await?;
    let Some(rows) = fetch_rows(ctx, interaction, data).await? else {
        return Ok(());
    };

    let members = weekly_earnings(&rows, week);
    let selector = MemberSelector::new(&members);
    if selector.is_empty() {
        let embed = create_info_embed("💎 Payout", "✅ No open payouts.");
        return followup_ephemeral(ctx, interaction, embed, vec![]).await;
    }

    followup_ephemeral(
        ctx,
        interaction,
        pay_all_confirm_embed(selector.count(), selector.total_cents()),
        pay_all_components(week),
    )
    .await
}

pub async fn pay_all_confirmed(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    week: &str,
) -> Result<(), Error> {
    replace_message(ctx, interaction, pay_all_progress_embed(0, 0)).await?;

    let admin = &interaction.user.name;
    let result = data
        .payouts
        .pay_all(week, admin, move |done, total| {
            edit_embed(ctx, interaction, pay_all_progress_embed(done, total))
        })
        .await;

    let embed = match result {
        Ok(report) => {
            tracing::info!(
                "{} paid out {} member(s) for {}, {} failed",
                admin,
                report.paid.len(),
                week,
                report.failed.len()
            );
            for earnings in &report.paid {
                send_payout_dm(ctx, earnings).await;
            }
            pay_all_result_embed(&report)
        }
        Err(e) => {
            tracing::error!("Pay all for {} failed: {:?}", week, e);
            create_error_embed("❌ Payout failed", "The spreadsheet could not be read.")
        }
    };

    edit_embed(ctx, interaction, embed).await;
    Ok(())
}

/// Sends a fresh panel for the current week.
pub async fn refresh(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    defer_ephemeral(ctx, interaction).await?;
    let Some(rows) = fetch_rows(ctx, interaction, data).await? else {
        return Ok(());
    };

    let week = current_week_key();
    let members = weekly_earnings(&rows, &week);
    followup_ephemeral(
        ctx,
        interaction,
        payout_panel_embed(&week, &members),
        panel_components(&week, &members),
    )
    .await
}

/// The payout already happened, so a closed DM channel is only logged.
async fn send_payout_dm(ctx: &serenity::Context, earnings: &MemberEarnings) {
    let user_id = match earnings.user_id.parse::<u64>() {
        Ok(id) if id > 0 => serenity::UserId::new(id),
        _ => {
            tracing::warn!("Cannot DM {}: invalid user id {:?}", earnings.username, earnings.user_id);
            return;
        }
    };

    let message = serenity::CreateMessage::new().embed(payout_dm_embed(&earnings.username, earnings));
    if let Err(e) = user_id.direct_message(ctx, message).await {
        tracing::warn!("Could not DM {}: {:?}", earnings.username, e);
    }
}
