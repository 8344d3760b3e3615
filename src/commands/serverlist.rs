use poise::serenity_prelude::{CreateAttachment, GuildId};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds::{self, LIST_BROKEN, LIST_OK, LIST_UNSET};
use crate::services::mod_channel::resolve_mod_channel;
use crate::services::platform::ChatPlatform;
use crate::services::serenity_platform::SerenityPlatform;

/// Discord's limit on an embed description
const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// One line of the server list
pub fn server_line(marker: &str, name: &str, id: GuildId, members: u64) -> String {
    format!("`{}` {} (`{}`): {} members", marker, name, id, members)
}

/// List every server the bot is in with its setup state
#[poise::command(slash_command, guild_only)]
pub async fn serverlist(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    ctx.defer_ephemeral().await?;

    let platform = SerenityPlatform::new(ctx.serenity_context(), data.settings.log_channel_id);
    let mut guilds = platform.guilds().await?;
    guilds.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let mut lines = Vec::with_capacity(guilds.len());
    for guild in &guilds {
        let marker = if !data.store.get(guild.id).first_time_setup {
            LIST_UNSET
        } else if resolve_mod_channel(&platform, &data.store, guild.id).await.is_some() {
            LIST_OK
        } else {
            LIST_BROKEN
        };
        let members = ctx
            .cache()
            .guild(guild.id)
            .map(|g| g.member_count)
            .unwrap_or(0);
        lines.push(server_line(marker, &guild.name, guild.id, members));
    }

    let list = lines.join("\n");
    let title = format!("Servers ({})", guilds.len());
    let reply = if list.chars().count() <= MAX_DESCRIPTION_LENGTH {
        poise::CreateReply::default().embed(embeds::info_embed().title(title).description(list))
    } else {
        poise::CreateReply::default()
            .embed(embeds::info_embed().title(title).description("See attached list."))
            .attachment(CreateAttachment::bytes(list.into_bytes(), "servers.txt"))
    };
    ctx.send(reply.ephemeral(true)).await?;
    Ok(())
}
