pub mod admin_flow;
pub mod custom_id;
pub mod log_flow;
pub mod payout_flow;

use crate::bot::checks::member_may_pay_out;
use crate::bot::{Data, Error};
use crate::utils::format::{create_error_embed, no_permission_embed};
use custom_id::ComponentAction;
use poise::serenity_prelude as serenity;

pub async fn handle_component(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let custom_id = &interaction.data.custom_id;

    let Some(action) = ComponentAction::parse(custom_id) else {
        tracing::warn!("Unknown component {}", custom_id);
        return reply_ephemeral(
            ctx,
            interaction,
            create_error_embed("❌ Error", "This component is no longer valid."),
        )
        .await;
    };

    let member = interaction.member.as_ref();
    let denied = (action.needs_payout_permission() && !member_may_pay_out(data, member).await)
        || (action.needs_administrator() && !is_administrator(member));
    if denied {
        tracing::warn!("{} was denied {}", interaction.user.name, custom_id);
        return reply_ephemeral(ctx, interaction, no_permission_embed()).await;
    }

    match action {
        ComponentAction::LogActionSelect => log_flow::open_modal(ctx, interaction).await,
        ComponentAction::LogStats => log_flow::show_stats(ctx, interaction, data).await,
        ComponentAction::PayoutSelect { week } => {
            payout_flow::member_selected(ctx, interaction, data, &week).await
        }
        ComponentAction::PayoutConfirm { user_id, week } => {
            payout_flow::confirm_payout(ctx, interaction, data, user_id, &week).await
        }
        ComponentAction::PayAll { week } => {
            payout_flow::pay_all_prompt(ctx, interaction, data, &week).await
        }
        ComponentAction::PayAllConfirm { week } => {
            payout_flow::pay_all_confirmed(ctx, interaction, data, &week).await
        }
        ComponentAction::PayoutCancel | ComponentAction::PayAllCancel => {
            close_message(ctx, interaction, "❌ Payout cancelled.").await
        }
        ComponentAction::PanelRefresh => payout_flow::refresh(ctx, interaction, data).await,
        ComponentAction::PanelClose => close_message(ctx, interaction, "Panel closed.").await,
        ComponentAction::PurgeConfirm { cutoff } => {
            admin_flow::purge_confirmed(ctx, interaction, data, cutoff).await
        }
        ComponentAction::PurgeCancel => close_message(ctx, interaction, "❌ Deletion cancelled.").await,
        ComponentAction::LogModal(_) => {
            reply_ephemeral(
                ctx,
                interaction,
                create_error_embed("❌ Error", "This component is no longer valid."),
            )
            .await
        }
    }
}

pub async fn handle_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    match ComponentAction::parse(&interaction.data.custom_id) {
        Some(ComponentAction::LogModal(action)) => {
            log_flow::modal_submitted(ctx, interaction, data, action).await
        }
        _ => {
            tracing::warn!("Unknown modal {}", interaction.data.custom_id);
            interaction
                .create_response(
                    &ctx.http,
                    serenity::CreateInteractionResponse::Message(
                        serenity::CreateInteractionResponseMessage::new()
                            .embed(create_error_embed("❌ Error", "This form is no longer valid."))
                            .ephemeral(true),
                    ),
                )
                .await?;
            Ok(())
        }
    }
}

fn is_administrator(member: Option<&serenity::Member>) -> bool {
    member
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator())
}

pub(crate) async fn reply_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    embed: serenity::CreateEmbed,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

pub(crate) async fn defer_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Defer(
                serenity::CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

pub(crate) async fn followup_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    embed: serenity::CreateEmbed,
    components: Vec<serenity::CreateActionRow>,
) -> Result<(), Error> {
    interaction
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new()
                .embed(embed)
                .components(components)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Replaces the clicked message with a short notice and drops its components.
async fn close_message(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

/// Swaps the clicked message for `embed` without components so it cannot be clicked twice.
pub(crate) async fn replace_message(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    embed: serenity::CreateEmbed,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

pub(crate) async fn edit_embed(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    embed: serenity::CreateEmbed,
) {
    if let Err(e) = interaction
        .edit_response(&ctx.http, serenity::EditInteractionResponse::new().embed(embed))
        .await
    {
        tracing::warn!("Failed to update interaction message: {:?}", e);
    }
}
