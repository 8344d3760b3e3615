use poise::serenity_prelude::{ChannelId, CreateEmbed, CreateMessage};
use tracing::debug;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds::{self, check_mark};
use crate::constants::messages::STATUS_TEST_MESSAGES;
use crate::services::mod_channel::resolve_mod_channel;
use crate::services::platform::ChatPlatform;
use crate::services::serenity_platform::SerenityPlatform;
use crate::utils::formatting::mention_channel;
use crate::utils::permissions::{maybe_has_permission_level, PermissionLevel};

/// Pick a test line from a seed
pub fn test_line(seed: u32) -> &'static str {
    STATUS_TEST_MESSAGES[seed as usize % STATUS_TEST_MESSAGES.len()]
}

/// Post a test line in the mod channel and remove it again
async fn round_trip(ctx: Context<'_>, channel_id: ChannelId) -> Result<(), Error> {
    let seed = chrono::Utc::now().timestamp_subsec_nanos();
    let message = channel_id
        .send_message(ctx, CreateMessage::new().content(test_line(seed)))
        .await?;
    message.delete(ctx).await?;
    Ok(())
}

/// Check whether this server's configuration works
#[poise::command(slash_command, guild_only)]
pub async fn status(
    ctx: Context<'_>,
    #[description = "Post and delete a test message in the mod channel"] debug: Option<bool>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();

    ctx.defer_ephemeral().await?;

    let platform = SerenityPlatform::new(ctx.serenity_context(), data.settings.log_channel_id);
    let record = data.store.get(guild_id);
    let channel = resolve_mod_channel(&platform, &data.store, guild_id).await;
    let can_ban = maybe_has_permission_level(
        platform.bot_permissions(guild_id).await,
        PermissionLevel::BanMembers,
    );

    let channel_text = match (channel, record.mod_channel) {
        (Some(channel_id), _) => format!("{} {}", check_mark(true), mention_channel(channel_id)),
        (None, Some(channel_id)) => format!(
            "{} {} (cannot view or send messages)",
            check_mark(false),
            mention_channel(channel_id)
        ),
        (None, None) => format!("{} Not set", check_mark(false)),
    };

    let mut embeds_out: Vec<CreateEmbed> = vec![embeds::info_embed()
        .title("Server Status")
        .field("Mod Channel", channel_text, false)
        .field("Ban Members", check_mark(can_ban), true)
        .field(
            "Bans From Anyone",
            check_mark(record.allow_bans_from_anyone),
            true,
        )];

    if debug.unwrap_or(false) {
        let failure = match channel {
            Some(channel_id) => round_trip(ctx, channel_id).await.err().map(|e| e.to_string()),
            None => Some("There is no usable mod channel to test.".to_string()),
        };
        match failure {
            Some(problem) => {
                debug!("Status test in guild {} failed: {}", guild_id, problem);
                embeds_out.push(
                    embeds::error_embed()
                        .title("Test Message Failed")
                        .description(problem),
                );
            }
            None => embeds_out.push(
                embeds::success_embed()
                    .title("Test Message Sent")
                    .description("A test message was posted and deleted in the mod channel."),
            ),
        }
    }

    let reply = embeds_out
        .into_iter()
        .fold(poise::CreateReply::default().ephemeral(true), |reply, embed| {
            reply.embed(embed)
        });
    ctx.send(reply).await?;
    Ok(())
}
