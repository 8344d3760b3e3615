use std::time::Duration;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;

/// Human readable uptime, largest units first
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        total % 86_400 / 3_600,
        total % 3_600 / 60,
        total % 60,
    );
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Show information about the bot
#[poise::command(slash_command)]
pub async fn info(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let name = ctx.cache().current_user().name.clone();

    let embed = embeds::info_embed()
        .title(name)
        .field("Version", env!("CARGO_PKG_VERSION"), true)
        .field("Library", "serenity + poise", true)
        .field("Uptime", format_uptime(data.started_at.elapsed()), true)
        .field("Servers", ctx.cache().guild_count().to_string(), true);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
