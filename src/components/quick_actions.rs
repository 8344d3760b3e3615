use std::sync::Arc;

use serenity::all::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
    GuildId,
};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::interaction::reply_component;
use crate::services::propagation::report::{QuickBanContext, QuickUnbanContext};
use crate::services::propagation::{
    ban_reason, quick_ban, quick_unban, QuickActionOutcome,
};
use crate::services::serenity_platform::SerenityPlatform;
use crate::utils::formatting::{mention_user, message_link};

async fn announce(ctx: &Context, component: &ComponentInteraction, content: String) -> Result<(), Error> {
    component
        .create_response(
            ctx,
            CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().content(content)),
        )
        .await?;
    Ok(())
}

/// "Ban User" pressed on a delivered report
pub async fn handle_quick_ban(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
    guild_id: GuildId,
    context: &QuickBanContext,
) -> Result<(), Error> {
    let bot_name = ctx.cache.current_user().name.clone();
    let link = message_link(guild_id, component.channel_id, component.message.id);
    let reason = ban_reason(&bot_name, &context.rationale, &link);

    let platform = SerenityPlatform::new(ctx, data.settings.log_channel_id);
    let outcome = quick_ban(
        &platform,
        &data.store,
        guild_id,
        component.user.id,
        context,
        &reason,
    )
    .await?;

    match outcome {
        QuickActionOutcome::Done => {
            announce(
                ctx,
                component,
                format!(
                    "{} banned {} ({}).",
                    mention_user(component.user.id),
                    context.account_tag,
                    context.account
                ),
            )
            .await
        }
        QuickActionOutcome::Denied(denied) => {
            reply_component(ctx, component, &denied.to_string()).await
        }
    }
}

/// "Unban User" pressed on a false report notice
pub async fn handle_quick_unban(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
    guild_id: GuildId,
    context: &QuickUnbanContext,
) -> Result<(), Error> {
    let platform = SerenityPlatform::new(ctx, data.settings.log_channel_id);
    let outcome = quick_unban(&platform, &data.store, guild_id, component.user.id, context).await?;

    match outcome {
        QuickActionOutcome::Done => {
            announce(
                ctx,
                component,
                format!(
                    "{} unbanned {} ({}).",
                    mention_user(component.user.id),
                    context.account_tag,
                    context.account
                ),
            )
            .await
        }
        QuickActionOutcome::Denied(denied) => {
            reply_component(ctx, component, &denied.to_string()).await
        }
    }
}
