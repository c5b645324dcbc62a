use crate::bot::interactions::log_flow::log_menu_components;
use crate::bot::{Context, Error};
use crate::utils::format::log_menu_embed;

/// Open the log system and submit an action
#[poise::command(slash_command, guild_only)]
pub async fn log(ctx: Context<'_>) -> Result<(), Error> {
    let reply = poise::CreateReply::default()
        .embed(log_menu_embed())
        .components(log_menu_components())
        .ephemeral(true);

    ctx.send(reply).await?;
    Ok(())
}
