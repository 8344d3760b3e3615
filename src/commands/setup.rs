use poise::serenity_prelude::{Channel, ChannelId};
use tracing::{info, warn};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::commands::registration;
use crate::constants::embeds;
use crate::constants::messages::{SETUP_FIRST_RUN, SETUP_UPDATED};
use crate::services::platform::ChatPlatform;
use crate::services::serenity_platform::SerenityPlatform;
use crate::store::GuildRecord;
use crate::utils::formatting::mention_channel;
use crate::utils::permissions::can_post;

/// Apply a `/setup` run to a record, returning whether it was the first.
/// Omitting the option turns open quick bans off again.
fn apply_setup(record: &mut GuildRecord, channel_id: ChannelId, allow: Option<bool>) -> bool {
    let first_run = !record.first_time_setup;
    record.mod_channel = Some(channel_id);
    record.first_time_setup = true;
    record.allow_bans_from_anyone = allow.unwrap_or(false);
    first_run
}

/// Configure where ban reports are posted
#[poise::command(slash_command, guild_only)]
pub async fn setup(
    ctx: Context<'_>,
    #[description = "Channel that receives ban reports"]
    #[channel_types("Text", "News")]
    mod_channel: Channel,
    #[description = "Let members without Ban Members use the \"Ban User\" button"]
    allow_bans_from_anyone: Option<bool>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let channel_id = mod_channel.id();
    let data = ctx.data();

    let platform = SerenityPlatform::new(ctx.serenity_context(), data.settings.log_channel_id);
    let usable = platform
        .bot_channel_permissions(guild_id, channel_id)
        .await
        .is_some_and(can_post);
    if !usable {
        let embed = embeds::error_embed().title("Setup Failed").description(format!(
            "I cannot view or send messages in {}!",
            mention_channel(channel_id)
        ));
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        return Ok(());
    }

    let first_run = data.store.update(guild_id, |record| {
        apply_setup(record, channel_id, allow_bans_from_anyone)
    })?;

    info!(
        "Guild {} set mod channel to {} (first run: {})",
        guild_id, channel_id, first_run
    );

    let message = if first_run { SETUP_FIRST_RUN } else { SETUP_UPDATED };
    ctx.send(
        poise::CreateReply::default()
            .embed(embeds::success_embed().title("Setup").description(message))
            .ephemeral(true),
    )
    .await?;

    if let Err(e) = registration::sync_guild(
        &ctx.serenity_context().http,
        &data.settings,
        &data.store,
        &ctx.framework().options().commands,
        guild_id,
    )
    .await
    {
        warn!("Failed to update commands in guild {}: {}", guild_id, e);
    }

    Ok(())
}
