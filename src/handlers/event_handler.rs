use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{debug, error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::commands::registration;
use crate::handlers::interaction;
use crate::services::propagation::report::PendingBan;
use crate::services::propagation::{detect_ban, IntakeOutcome};
use crate::services::serenity_platform::SerenityPlatform;
use crate::utils::formatting::format_user_raw;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!(
                "Bot ready as {} in {} guilds",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }

        FullEvent::GuildBanAddition {
            guild_id,
            banned_user,
        } => {
            let pending = PendingBan {
                account: banned_user.id,
                account_tag: format_user_raw(banned_user),
                origin_guild: *guild_id,
                origin_name: guild_id
                    .name(&ctx.cache)
                    .unwrap_or_else(|| guild_id.to_string()),
            };
            let platform = SerenityPlatform::new(ctx, data.settings.log_channel_id);
            match detect_ban(&platform, &data.store, &data.settings, &data.callbacks, pending).await {
                Ok(IntakeOutcome::Prompted) => {}
                Ok(outcome) => {
                    debug!("Ban of {} in guild {}: {:?}", banned_user.id, guild_id, outcome)
                }
                // Delivery failures are already sent to the log channel
                Err(e) => debug!(
                    "Ban prompt for {} in guild {} failed: {:?}",
                    banned_user.id, guild_id, e
                ),
            }
        }

        FullEvent::GuildCreate { guild, is_new } => {
            if *is_new == Some(true) {
                info!("Joined guild \"{}\" ({})", guild.name, guild.id);
                if let Err(e) = registration::sync_guild(
                    &ctx.http,
                    &data.settings,
                    &data.store,
                    &framework.options().commands,
                    guild.id,
                )
                .await
                {
                    warn!("Failed to register commands in guild {}: {}", guild.id, e);
                }
            }
        }

        FullEvent::GuildDelete { incomplete, .. } => {
            // The record stays on disk in case the bot is invited back
            info!("Removed from guild {}", incomplete.id);
        }

        FullEvent::InteractionCreate { interaction } => {
            // Poise handles ApplicationCommand (slash commands) automatically
            // We only handle Component and Modal interactions here for custom components
            match interaction {
                serenity::Interaction::Component(_) | serenity::Interaction::Modal(_) => {
                    if let Err(e) = interaction::handle_interaction(ctx, data, interaction).await {
                        error!("Component/Modal interaction handler error: {:?}", e);
                    }
                }
                _ => {}
            }
        }

        _ => {}
    }

    Ok(())
}
