pub mod checks;
pub mod commands;
pub mod handlers;
pub mod interactions;
pub mod scheduler;

use crate::config::Config;
use crate::permissions::PayoutRoles;
use crate::sheets::{self, client::SheetsClient};
use crate::utils::format::{create_error_embed, format_error_message, no_permission_embed};
use crate::utils::payout_manager::PayoutManager;
use anyhow::Result;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(Clone)]
pub struct Data {
    pub config: Config,
    pub sheets: Arc<SheetsClient>,
    pub payouts: PayoutManager,
    pub roles: Arc<PayoutRoles>,
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                tracing::error!("Check for /{} failed: {:?}", ctx.command().name, error);
            }
            let reply = poise::CreateReply::default()
                .embed(no_permission_embed())
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::error!("Failed to send permission error: {:?}", e);
            }
        }
        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
            let reply = poise::CreateReply::default()
                .embed(no_permission_embed())
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::error!("Failed to send permission error: {:?}", e);
            }
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Command /{} failed: {:?}", ctx.command().name, error);
            let reply = poise::CreateReply::default()
                .embed(create_error_embed(
                    "❌ Error",
                    &format_error_message(&error.to_string()),
                ))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                tracing::error!("Failed to send error reply: {:?}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {:?}", e);
            }
        }
    }
}

pub async fn create_bot(config: Config) -> Result<serenity::Client> {
    let sheets = Arc::new(sheets::create_client(&config)?);
    let roles = Arc::new(PayoutRoles::load(&config.config_file, config.payout_role_ids.clone()).await);

    let data = Data {
        config: config.clone(),
        sheets: sheets.clone(),
        payouts: PayoutManager::new(sheets),
        roles,
    };

    // attachments are only visible with MESSAGE_CONTENT
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::log::log(),
                commands::payout::panel(),
                commands::payout::payout(),
                commands::config::config(),
                commands::reports::weekly_report(),
                commands::reports::stats(),
                commands::reports::member_stats(),
                commands::admin::backup(),
                commands::admin::purge(),
                commands::admin::setup(),
                commands::help::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                if let Some(channel_id) = data.config.report_channel_id {
                    scheduler::spawn_weekly_report(
                        ctx.http.clone(),
                        data.sheets.clone(),
                        serenity::ChannelId::new(channel_id),
                    );
                }

                Ok(data)
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    Ok(client)
}
