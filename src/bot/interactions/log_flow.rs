use crate::bot::interactions::custom_id::ComponentAction;
use crate::bot::interactions::{defer_ephemeral, followup_ephemeral, reply_ephemeral};
use crate::bot::{Data, Error};
use crate::sheets::models::ActionType;
use crate::sheets::queries;
use crate::utils::earnings::member_earnings;
use crate::utils::format::{
    PublicLog, create_error_embed, create_warning_embed, format_amount, image_request_embed,
    log_saved_embed, member_week_embed, public_log_embed,
};
use crate::utils::time::{current_week_key, format_time, get_current_datetime, week_key};
use crate::utils::validation::{DESCRIPTION_MAX_CHARS, is_image_attachment, validate_description};
use poise::serenity_prelude as serenity;
use std::time::Duration;

const PROOF_TIMEOUT_SECS: u64 = 60;

pub fn log_menu_components() -> Vec<serenity::CreateActionRow> {
    let options = ActionType::ALL
        .iter()
        .map(|action| {
            serenity::CreateSelectMenuOption::new(
                format!("{} {}", action.emoji(), action.label()),
                action.key(),
            )
            .description(format!("Payout: {}", format_amount(action.amount_cents())))
        })
        .collect();

    let select = serenity::CreateSelectMenu::new(
        ComponentAction::LogActionSelect.custom_id(),
        serenity::CreateSelectMenuKind::String { options },
    )
    .placeholder("💜 Pick an action...");

    let stats = serenity::CreateButton::new(ComponentAction::LogStats.custom_id())
        .label("📊 My stats")
        .style(serenity::ButtonStyle::Secondary);

    vec![
        serenity::CreateActionRow::SelectMenu(select),
        serenity::CreateActionRow::Buttons(vec![stats]),
    ]
}

pub async fn open_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let selected = if let serenity::ComponentInteractionDataKind::StringSelect { values } =
        &interaction.data.kind
    {
        values.first().and_then(|key| ActionType::from_key(key))
    } else {
        None
    };

    let Some(action) = selected else {
        return reply_ephemeral(
            ctx,
            interaction,
            create_error_embed("❌ Error", "Unknown action."),
        )
        .await;
    };

    let modal = serenity::CreateModal::new(
        ComponentAction::LogModal(action).custom_id(),
        format!("Log: {}", action.label()),
    )
    .components(vec![serenity::CreateActionRow::InputText(
        serenity::CreateInputText::new(
            serenity::InputTextStyle::Paragraph,
            "Description",
            "description",
        )
        .placeholder("Briefly describe what you did...")
        .required(true)
        .max_length(DESCRIPTION_MAX_CHARS as u16),
    )]);

    interaction
        .create_response(&ctx.http, serenity::CreateInteractionResponse::Modal(modal))
        .await?;

    Ok(())
}

pub async fn show_stats(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    defer_ephemeral(ctx, interaction).await?;

    let rows = match queries::fetch_log_rows(&data.sheets).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to load stats for {}: {:?}", interaction.user.name, e);
            let embed = create_error_embed("❌ Error", "Your statistics could not be loaded.");
            return followup_ephemeral(ctx, interaction, embed, vec![]).await;
        }
    };

    let mut earnings = member_earnings(&rows, &interaction.user.id.to_string(), &current_week_key());
    if earnings.username.is_empty() {
        earnings.username = interaction.user.name.clone();
    }

    followup_ephemeral(
        ctx,
        interaction,
        member_week_embed(&earnings, &interaction.user.face()),
        vec![],
    )
    .await
}

async fn followup(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    embed: serenity::CreateEmbed,
) -> Result<(), Error> {
    interaction
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new()
                .embed(embed)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Description submitted: wait for the proof image, then record the log.
pub async fn modal_submitted(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
    action: ActionType,
) -> Result<(), Error> {
    let raw_description = interaction
        .data
        .components
        .first()
        .and_then(|row| row.components.first())
        .and_then(|component| {
            if let serenity::ActionRowComponent::InputText(input) = component {
                input.value.as_deref()
            } else {
                None
            }
        })
        .unwrap_or("");

    let description = match validate_description(raw_description) {
        Ok(description) => description.to_string(),
        Err(e) => {
            interaction
                .create_response(
                    &ctx.http,
                    serenity::CreateInteractionResponse::Message(
                        serenity::CreateInteractionResponseMessage::new()
                            .embed(create_error_embed("❌ Error", &e.to_string()))
                            .ephemeral(true),
                    ),
                )
                .await?;
            return Ok(());
        }
    };

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Defer(
                serenity::CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;
    followup(
        ctx,
        interaction,
        image_request_embed(action, &description, PROOF_TIMEOUT_SECS),
    )
    .await?;

    let proof = serenity::MessageCollector::new(ctx)
        .author_id(interaction.user.id)
        .channel_id(interaction.channel_id)
        .filter(|message| !message.attachments.is_empty())
        .timeout(Duration::from_secs(PROOF_TIMEOUT_SECS))
        .next()
        .await;

    let Some(message) = proof else {
        let embed = create_warning_embed("⏱️ Time is up", "You took too long. Please try again.");
        return followup(ctx, interaction, embed).await;
    };

    let Some(image) = message
        .attachments
        .iter()
        .find(|a| is_image_attachment(a.content_type.as_deref(), &a.filename))
    else {
        let embed = create_error_embed("❌ Error", "The proof must be an image. Please start again with /log.");
        return followup(ctx, interaction, embed).await;
    };

    let now = get_current_datetime();
    let user = &interaction.user;
    if let Err(e) = queries::save_log(
        &data.sheets,
        &user.name,
        &user.id.to_string(),
        action,
        &description,
        &image.url,
        now,
    )
    .await
    {
        tracing::error!("Failed to save log for {}: {:?}", user.name, e);
        let embed = create_error_embed(
            "❌ Error",
            "Your log could not be saved. Please contact an admin.",
        );
        return followup(ctx, interaction, embed).await;
    }

    followup(
        ctx,
        interaction,
        log_saved_embed(action, &description, &image.url, &user.name),
    )
    .await?;

    if let Some(channel_id) = data.config.log_output_channel_id {
        let week = week_key(now.date());
        let log = PublicLog {
            user_id: user.id,
            username: &user.name,
            avatar_url: user.face(),
            action,
            description: &description,
            image_url: &image.url,
            week: &week,
            time: format_time(now),
            week_logs: 0,
            log_number: 0,
        };
        post_public_log(ctx, data, serenity::ChannelId::new(channel_id), log).await;
    }

    Ok(())
}

/// Best effort: the log is already saved, so failures here are only logged.
async fn post_public_log(
    ctx: &serenity::Context,
    data: &Data,
    channel_id: serenity::ChannelId,
    mut log: PublicLog<'_>,
) {
    match queries::fetch_log_rows(&data.sheets).await {
        Ok(rows) => {
            log.week_logs = member_earnings(&rows, &log.user_id.to_string(), log.week).log_count;
        }
        Err(e) => tracing::warn!("Could not load weekly progress: {:?}", e),
    }
    match queries::total_log_count(&data.sheets).await {
        Ok(count) => log.log_number = count,
        Err(e) => tracing::warn!("Could not count logs: {:?}", e),
    }

    let message = serenity::CreateMessage::new().embed(public_log_embed(&log));
    match channel_id.send_message(&ctx.http, message).await {
        Ok(_) => tracing::info!("Log posted to channel {}", channel_id),
        Err(e) => tracing::warn!("Failed to post log to channel {}: {:?}", channel_id, e),
    }
}
