use poise::serenity_prelude::{ChannelType, GetMessages};
use tracing::info;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::constants::limits::MAX_BULK_DELETE;

/// Number of messages a purge may remove
pub fn purge_count(requested: u8, configured_max: u8) -> u8 {
    requested.min(configured_max).min(MAX_BULK_DELETE)
}

/// Delete recent messages in this channel
#[poise::command(slash_command, guild_only)]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "Number of messages to delete"]
    #[min = 1]
    #[max = 100]
    amount: u8,
) -> Result<(), Error> {
    let channel_id = ctx.channel_id();

    let is_text = ctx
        .guild_channel()
        .await
        .is_some_and(|channel| matches!(channel.kind, ChannelType::Text | ChannelType::News));
    if !is_text {
        let embed = embeds::error_embed()
            .title("Error")
            .description("Messages can only be purged in text channels.");
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    let count = purge_count(amount, ctx.data().settings.purge_max);
    let messages = channel_id
        .messages(ctx, GetMessages::new().limit(count))
        .await?;
    let ids: Vec<_> = messages.iter().map(|message| message.id).collect();
    if !ids.is_empty() {
        channel_id.delete_messages(ctx, &ids).await?;
    }

    info!(
        "{} purged {} messages in channel {}",
        ctx.author().id,
        ids.len(),
        channel_id
    );

    let embed = embeds::success_embed()
        .title("Purge")
        .description(format!("Deleted {} messages.", ids.len()));
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_count_is_capped() {
        assert_eq!(purge_count(10, 100), 10);
        assert_eq!(purge_count(50, 20), 20);
        assert_eq!(purge_count(255, 255), MAX_BULK_DELETE);
    }
}
