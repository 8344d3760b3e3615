use std::sync::Arc;

use poise::serenity_prelude::UserId;
use tracing::info;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::constants::limits::{MAX_DETAILS_LENGTH, MIN_DETAILS_LENGTH};
use crate::constants::messages::NOTIFICATIONS_SENT;
use crate::services::callbacks::{ButtonCallback, CallbackKind, CallbackToken};
use crate::services::propagation::fanout::{check_broadcast, check_false_report};
use crate::services::propagation::report::{Broadcast, FalseReport};
use crate::services::propagation::{propagate_broadcast, propagate_retraction, FanoutSummary};
use crate::services::serenity_platform::SerenityPlatform;
use crate::utils::formatting::format_user_raw;

/// Send notifications to every server in the network
#[poise::command(slash_command, subcommands("false_report", "broadcast"), guild_only)]
pub async fn notify(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

async fn reply_error(ctx: Context<'_>, message: String) -> Result<(), Error> {
    let embed = embeds::error_embed().title("Error").description(message);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn reply_sent(ctx: Context<'_>, summary: &FanoutSummary) -> Result<(), Error> {
    let embed = embeds::success_embed()
        .title(NOTIFICATIONS_SENT)
        .description(format!(
            "Delivered to {} servers, {} could not be reached.",
            summary.delivered.len(),
            summary.unreachable.len() + summary.failed.len()
        ));
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Tell the network that a reported user was reported by mistake
#[poise::command(slash_command, guild_only)]
pub async fn false_report(
    ctx: Context<'_>,
    #[description = "ID of the falsely reported user"] user_id: String,
    #[description = "What happened"]
    #[min_length = 10]
    #[max_length = 1000]
    details: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();

    let Some(account) = user_id.trim().parse::<u64>().ok().filter(|id| *id != 0).map(UserId::new)
    else {
        return reply_error(ctx, format!("`{}` is not a valid user ID!", user_id)).await;
    };

    let length = details.chars().count();
    if length < MIN_DETAILS_LENGTH as usize || length > MAX_DETAILS_LENGTH as usize {
        return reply_error(
            ctx,
            format!(
                "Details must be between {} and {} characters long.",
                MIN_DETAILS_LENGTH, MAX_DETAILS_LENGTH
            ),
        )
        .await;
    }

    if let Err(denied) = check_false_report(&data.settings, &data.store, guild_id, account) {
        return reply_error(ctx, denied.to_string()).await;
    }

    ctx.defer_ephemeral().await?;

    let account_tag = match account.to_user(ctx).await {
        Ok(user) => format_user_raw(&user),
        Err(_) => account.to_string(),
    };
    let origin_name = guild_id
        .name(ctx.cache())
        .unwrap_or_else(|| guild_id.to_string());

    let retraction = FalseReport {
        account,
        account_tag,
        origin_guild: guild_id,
        origin_name,
        details,
    };

    // The old report's context must not answer "Ban User" any more
    data.callbacks
        .unregister(CallbackKind::Button, &CallbackToken::quick_ban(account));
    data.callbacks.register_button(
        CallbackToken::quick_unban(account),
        ButtonCallback::QuickUnban(Arc::new(retraction.quick_unban_context())),
    );

    info!(
        "{} retracted the report of {} from guild {}",
        ctx.author().id,
        account,
        guild_id
    );

    let platform = SerenityPlatform::new(ctx.serenity_context(), data.settings.log_channel_id);
    let summary = propagate_retraction(&platform, &data.store, &retraction).await?;
    reply_sent(ctx, &summary).await
}

/// Send a message to every server in the network
#[poise::command(slash_command, guild_only)]
pub async fn broadcast(
    ctx: Context<'_>,
    #[description = "Message to send"]
    #[max_length = 2000]
    message: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let data = ctx.data();

    if let Err(denied) = check_broadcast(&data.settings, ctx.author().id) {
        return reply_error(ctx, denied.to_string()).await;
    }

    ctx.defer_ephemeral().await?;

    let broadcast = Broadcast {
        author: ctx.author().id,
        author_tag: format_user_raw(ctx.author()),
        origin_name: guild_id
            .name(ctx.cache())
            .unwrap_or_else(|| guild_id.to_string()),
        message,
    };

    let platform = SerenityPlatform::new(ctx.serenity_context(), data.settings.log_channel_id);
    let summary = propagate_broadcast(&platform, &data.store, &broadcast).await?;
    reply_sent(ctx, &summary).await
}
