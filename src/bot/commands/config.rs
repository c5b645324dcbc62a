use crate::bot::{Context, Error};
use crate::utils::format::{
    create_error_embed, format_info_message, format_success_message, roles_embed,
};
use poise::serenity_prelude as serenity;

/// Configure which roles may issue payouts
#[poise::command(
    slash_command,
    subcommands("add", "remove", "list"),
    subcommand_required,
    default_member_permissions = "ADMINISTRATOR",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn config(_: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Allow a role to issue payouts
#[poise::command(slash_command, ephemeral, required_permissions = "ADMINISTRATOR")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "The role to allow"] role: serenity::Role,
) -> Result<(), Error> {
    match ctx.data().roles.add(role.id.get()).await {
        Ok(true) => {
            ctx.say(format_success_message(&format!(
                "<@&{}> can now issue payouts.",
                role.id
            )))
            .await?;
        }
        Ok(false) => {
            ctx.say(format_info_message(&format!(
                "<@&{}> already has permission.",
                role.id
            )))
            .await?;
        }
        Err(e) => {
            tracing::error!("Failed to save payout roles: {:?}", e);
            let embed = create_error_embed("❌ Error", &format!("Could not save the role list: {}", e));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
    }
    Ok(())
}

/// Stop a role from issuing payouts
#[poise::command(slash_command, ephemeral, required_permissions = "ADMINISTRATOR")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "The role to remove"] role: serenity::Role,
) -> Result<(), Error> {
    match ctx.data().roles.remove(role.id.get()).await {
        Ok(true) => {
            ctx.say(format_success_message(&format!(
                "<@&{}> can no longer issue payouts.",
                role.id
            )))
            .await?;
        }
        Ok(false) => {
            ctx.say(format_info_message(&format!(
                "<@&{}> had no permission.",
                role.id
            )))
            .await?;
        }
        Err(e) => {
            tracing::error!("Failed to save payout roles: {:?}", e);
            let embed = create_error_embed("❌ Error", &format!("Could not save the role list: {}", e));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
    }
    Ok(())
}

/// Show the roles that may issue payouts
#[poise::command(slash_command, ephemeral, required_permissions = "ADMINISTRATOR")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let roles = ctx.data().roles.list().await;
    ctx.send(poise::CreateReply::default().embed(roles_embed(&roles)))
        .await?;
    Ok(())
}
