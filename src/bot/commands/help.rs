use crate::bot::{Context, Error};
use crate::utils::format::help_embed;

/// Show all available commands
#[poise::command(slash_command, ephemeral)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(help_embed()))
        .await?;
    Ok(())
}
