use crate::bot::interactions;
use crate::bot::{Data, Error};
use poise::serenity_prelude as serenity;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!("Bot logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::InteractionCreate { interaction } => match interaction {
            serenity::Interaction::Component(component_interaction) => {
                if let Err(e) =
                    interactions::handle_component(ctx, component_interaction, data).await
                {
                    tracing::error!(
                        "Error handling component {}: {:?}",
                        component_interaction.data.custom_id,
                        e
                    );
                }
            }
            serenity::Interaction::Modal(modal_interaction) => {
                if let Err(e) = interactions::handle_modal(ctx, modal_interaction, data).await {
                    tracing::error!(
                        "Error handling modal {}: {:?}",
                        modal_interaction.data.custom_id,
                        e
                    );
                }
            }
            _ => {}
        },
        _ => {}
    }
    Ok(())
}
