use serenity::all::{Command as AppCommand, GuildId, GuildPagination, Http};
use tracing::{info, warn};

use crate::bot::error::Error;
use crate::commands::{policy, Command, CommandPolicy, Scope};
use crate::config::Settings;
use crate::store::GuildStore;

/// Whether a guild-scoped command belongs in a guild's command list
pub fn registered_in_guild(policy: CommandPolicy, whitelisted: bool, set_up: bool) -> bool {
    policy.scope == Scope::Guild && whitelisted && (set_up || policy.setup_exempt)
}

/// Replace a guild's command list with what its whitelist and setup state allow
pub async fn sync_guild(
    http: &Http,
    settings: &Settings,
    store: &GuildStore,
    commands: &[Command],
    guild_id: GuildId,
) -> Result<usize, Error> {
    let whitelisted = settings.is_whitelisted(guild_id);
    let set_up = store.get(guild_id).is_set_up();

    let builders: Vec<_> = commands
        .iter()
        .filter(|command| registered_in_guild(policy(&command.name), whitelisted, set_up))
        .filter_map(|command| command.create_as_slash_command())
        .collect();
    let count = builders.len();

    guild_id.set_commands(http, builders).await?;
    info!("Registered {} commands in guild {}", count, guild_id);
    Ok(count)
}

/// Register the commands that are not tied to a guild
pub async fn sync_global(http: &Http, commands: &[Command]) -> Result<usize, Error> {
    let builders: Vec<_> = commands
        .iter()
        .filter(|command| policy(&command.name).scope == Scope::Global)
        .filter_map(|command| command.create_as_slash_command())
        .collect();
    let count = builders.len();

    AppCommand::set_global_commands(http, builders).await?;
    info!("Registered {} global commands", count);
    Ok(count)
}

/// Global commands, then every guild the bot is in
pub async fn sync_all(
    http: &Http,
    settings: &Settings,
    store: &GuildStore,
    commands: &[Command],
) -> Result<(), Error> {
    sync_global(http, commands).await?;

    let mut after = None;
    loop {
        let page = http
            .get_guilds(after.map(GuildPagination::After), Some(200))
            .await?;
        for guild in &page {
            if let Err(e) = sync_guild(http, settings, store, commands, guild.id).await {
                warn!(
                    "Failed to register commands in guild \"{}\" ({}): {}",
                    guild.name, guild.id, e
                );
            }
        }
        if page.len() < 200 {
            break;
        }
        after = page.last().map(|guild| guild.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{all_commands, policy};

    fn names(whitelisted: bool, set_up: bool) -> Vec<String> {
        all_commands()
            .into_iter()
            .filter(|c| registered_in_guild(policy(&c.name), whitelisted, set_up))
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn test_unlisted_guild_gets_nothing() {
        assert!(names(false, false).is_empty());
        assert!(names(false, true).is_empty());
    }

    #[test]
    fn test_setup_unlocks_guild_commands() {
        assert_eq!(names(true, false), vec!["setup".to_string()]);

        let full = names(true, true);
        for name in ["setup", "notify", "status", "request", "purge", "serverlist"] {
            assert!(full.iter().any(|n| n == name), "{}", name);
        }
        assert!(!full.iter().any(|n| n == "info"));
    }
}
