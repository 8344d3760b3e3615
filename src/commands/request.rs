use poise::serenity_prelude::CreateAttachment;
use tracing::info;

use crate::bot::data::Context;
use crate::bot::error::Error;

/// Request data the bot keeps about this server
#[poise::command(slash_command, subcommands("db"), guild_only)]
pub async fn request(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Download this server's stored record
#[poise::command(slash_command, guild_only)]
pub async fn db(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let store = &ctx.data().store;

    let path = store.data_path(guild_id);
    if !path.exists() {
        store.save(guild_id)?;
    }

    let attachment = CreateAttachment::path(&path).await?;
    ctx.send(
        poise::CreateReply::default()
            .content("Here is everything stored about this server:")
            .attachment(attachment)
            .ephemeral(true),
    )
    .await?;

    info!("{} downloaded the record of guild {}", ctx.author().id, guild_id);
    Ok(())
}
