use crate::bot::interactions::custom_id::ComponentAction;
use crate::bot::interactions::{edit_embed, replace_message};
use crate::bot::{Data, Error};
use crate::utils::format::{create_error_embed, create_info_embed, create_success_embed};
use crate::utils::time::DATE_FORMAT;
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;

pub fn purge_confirm_components(cutoff: NaiveDate) -> Vec<serenity::CreateActionRow> {
    let confirm = serenity::CreateButton::new(ComponentAction::PurgeConfirm { cutoff }.custom_id())
        .label("🗑️ Delete")
        .style(serenity::ButtonStyle::Danger);
    let cancel = serenity::CreateButton::new(ComponentAction::PurgeCancel.custom_id())
        .label("❌ Cancel")
        .style(serenity::ButtonStyle::Secondary);

    vec![serenity::CreateActionRow::Buttons(vec![confirm, cancel])]
}

pub async fn purge_confirmed(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    cutoff: NaiveDate,
) -> Result<(), Error> {
    replace_message(ctx, interaction, create_info_embed("⏳ Deleting...", "Removing old logs.")).await?;

    let embed = match data.payouts.purge_before(cutoff).await {
        Ok(deleted) => {
            tracing::info!(
                "{} deleted {} log(s) before {}",
                interaction.user.name,
                deleted,
                cutoff
            );
            create_success_embed(
                "✅ Old logs deleted",
                &format!(
                    "**{}** log(s) before {} were deleted.",
                    deleted,
                    cutoff.format(DATE_FORMAT)
                ),
            )
        }
        Err(e) => {
            tracing::error!("Deleting logs before {} failed: {:?}", cutoff, e);
            create_error_embed("❌ Error", &format!("Deleting failed: {}", e))
        }
    };

    edit_embed(ctx, interaction, embed).await;
    Ok(())
}
