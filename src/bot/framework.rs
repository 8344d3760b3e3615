use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, Http};
use tracing::{error, info};

use crate::bot::data::{Context, Data};
use crate::bot::error::Error;
use crate::commands::{self, registration};
use crate::config::Settings;
use crate::constants::embeds;
use crate::constants::messages::GUILD_ONLY;
use crate::handlers::event_handler::event_handler;
use crate::services::maintenance;
use crate::services::platform::ChatPlatform;
use crate::services::serenity_platform::SerenityPlatform;
use crate::store::GuildStore;

/// Top-level name of the invoked command, so subcommands share their parent's policy
fn root_command_name(ctx: Context<'_>) -> String {
    ctx.parent_commands()
        .first()
        .map(|command| command.name.clone())
        .unwrap_or_else(|| ctx.command().name.clone())
}

/// Run the whitelist, setup and permission gate, replying once on rejection
async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let policy = commands::policy(&root_command_name(ctx));

    let Some(guild_id) = ctx.guild_id() else {
        if policy.scope == commands::Scope::Global {
            return Ok(true);
        }
        ctx.send(poise::CreateReply::default().content(GUILD_ONLY).ephemeral(true))
            .await?;
        return Ok(false);
    };

    let data = ctx.data();
    let whitelisted = data.settings.is_whitelisted(guild_id);
    let set_up = data.store.get(guild_id).is_set_up();

    let mut permissions = ctx
        .author_member()
        .await
        .and_then(|member| member.permissions);
    if permissions.is_none() {
        let platform = SerenityPlatform::new(ctx.serenity_context(), data.settings.log_channel_id);
        permissions = platform.member_permissions(guild_id, ctx.author().id).await;
    }

    match commands::gate(policy, whitelisted, set_up, permissions) {
        Ok(()) => Ok(true),
        Err(reply) => {
            ctx.send(poise::CreateReply::default().content(reply).ephemeral(true))
                .await?;
            Ok(false)
        }
    }
}

/// Log channel entry for a failed slash command
fn command_log_line(command: &str, message: &str) -> String {
    format!("{} (/{})", message, command)
}

async fn on_error(error: poise::FrameworkError<'_, Arc<Data>, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let message = format!("There was an error while executing this command: {}", error);
            SerenityPlatform::new(ctx.serenity_context(), ctx.data().settings.log_channel_id)
                .log_error(
                    ctx.guild_id(),
                    &command_log_line(&ctx.command().qualified_name, &message),
                )
                .await;
            let embed = embeds::error_embed().title("Error").description(message);
            if let Err(e) = ctx
                .send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await
            {
                error!("Could not report command error: {:?}", e);
            }
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
        }
        poise::FrameworkError::CommandCheckFailed { error, .. } => {
            // Rejections were already answered by the check itself
            if let Some(error) = error {
                error!("Command check error: {:?}", error);
            }
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            // Ignore unknown command errors - bot only uses slash commands
        }
        err => {
            error!("Framework error: {:?}", err);
        }
    }
}

pub async fn run(settings: Settings) -> Result<(), Error> {
    let data = Arc::new(Data::new(settings.clone())?);
    let framework_data = data.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None, // Disable prefix commands - only use slash commands
                ..Default::default()
            },
            command_check: Some(|ctx| Box::pin(command_check(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                maintenance::spawn_presence_updater(ctx.clone());
                info!("Started presence updater");

                maintenance::spawn_callback_sweeper(framework_data.clone());
                info!("Started callback sweeper");

                Ok(framework_data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MODERATION;

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Could not listen for interrupt: {}", e);
            return;
        }
        info!("Interrupt received, shutting down");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord client...");
    let result = client.start().await.map_err(Error::Serenity);

    let saved = data.store.save_all();
    info!("Saved {} guild records", saved);

    result
}

/// Sync every command list once, without connecting to the gateway
pub async fn update_commands(settings: Settings) -> Result<(), Error> {
    let http = Http::new(&settings.discord_token);
    http.set_application_id(settings.application_id);

    let store = GuildStore::new(settings.data_dir.clone());
    let commands = commands::all_commands();
    registration::sync_all(&http, &settings, &store, &commands).await?;

    info!("Command registration finished");
    Ok(())
}
