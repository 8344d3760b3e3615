use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serenity::all::{ApplicationId, ChannelId, GuildId, UserId};

use crate::constants::limits::{
    DEFAULT_CALLBACK_TTL_HOURS, DEFAULT_DATA_DIR, DEFAULT_LOG_FILE, MAX_BULK_DELETE,
};

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub application_id: ApplicationId,
    /// Guilds that take part in the report network
    pub whitelisted_guilds: HashSet<GuildId>,
    /// Users allowed to send free-form broadcasts to every guild
    pub broadcast_users: HashSet<UserId>,
    /// Remote destination for errors and warnings
    pub log_channel_id: Option<ChannelId>,
    /// Directory holding one JSON file per guild
    pub data_dir: PathBuf,
    /// Upper bound for `/purge`
    pub purge_max: u8,
    /// How long an unanswered button or form stays registered
    pub callback_ttl: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

        let application_id = env::var("APPLICATION_ID")
            .map_err(|_| "APPLICATION_ID environment variable not set".to_string())
            .and_then(|s| {
                s.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|id| *id != 0)
                    .map(ApplicationId::new)
                    .ok_or_else(|| format!("APPLICATION_ID is not a valid id: {}", s))
            })?;

        let whitelisted_guilds = parse_id_list(
            "WHITELISTED_GUILDS",
            &env::var("WHITELISTED_GUILDS").unwrap_or_default(),
        )?
        .into_iter()
        .map(GuildId::new)
        .collect();

        let broadcast_users = parse_id_list(
            "BROADCAST_USERS",
            &env::var("BROADCAST_USERS").unwrap_or_default(),
        )?
        .into_iter()
        .map(UserId::new)
        .collect();

        let log_channel_id = env::var("LOG_CHANNEL_ID")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|id| *id != 0)
                    .map(ChannelId::new)
                    .ok_or_else(|| format!("LOG_CHANNEL_ID is not a valid id: {}", s))
            })
            .transpose()?;

        let data_dir = env::var("DATA_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
            .into();

        let purge_max = env::var("PURGE_MAX")
            .ok()
            .and_then(|s| s.parse::<u8>().ok())
            .unwrap_or(MAX_BULK_DELETE)
            .clamp(1, MAX_BULK_DELETE);

        let callback_ttl_hours = env::var("CALLBACK_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CALLBACK_TTL_HOURS);

        Ok(Self {
            discord_token,
            application_id,
            whitelisted_guilds,
            broadcast_users,
            log_channel_id,
            data_dir,
            purge_max,
            callback_ttl: hours(callback_ttl_hours),
        })
    }

    pub fn is_whitelisted(&self, guild_id: GuildId) -> bool {
        self.whitelisted_guilds.contains(&guild_id)
    }

    pub fn can_broadcast(&self, user_id: UserId) -> bool {
        self.broadcast_users.contains(&user_id)
    }
}

/// Path of the persistent text log, read before the rest of the settings
/// so that tracing is up before anything else can fail.
pub fn log_file_path() -> PathBuf {
    env::var("LOG_FILE")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
        .into()
}

/// Parse a comma-separated list of snowflakes, naming `var` on failure
fn parse_id_list(var: &str, raw: &str) -> Result<Vec<u64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .ok()
                .filter(|id| *id != 0)
                .ok_or_else(|| format!("{} contains an invalid id: {}", var, s))
        })
        .collect()
}

#[cfg(test)]
impl Settings {
    /// Settings for tests, with every guild in `guilds` whitelisted
    pub fn for_tests(guilds: &[u64]) -> Self {
        Self {
            discord_token: String::new(),
            application_id: ApplicationId::new(1),
            whitelisted_guilds: guilds.iter().copied().map(GuildId::new).collect(),
            broadcast_users: HashSet::new(),
            log_channel_id: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            purge_max: MAX_BULK_DELETE,
            callback_ttl: hours(DEFAULT_CALLBACK_TTL_HOURS),
        }
    }
}

/// Hours as a duration, saturating on absurdly large values
fn hours(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(60 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_saturates() {
        assert_eq!(hours(2), Duration::from_secs(7200));
        assert_eq!(hours(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("X", "").unwrap(), Vec::<u64>::new());
        assert_eq!(parse_id_list("X", "1, 2,,3 ").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_id_list_names_variable() {
        let err = parse_id_list("WHITELISTED_GUILDS", "12,abc").unwrap_err();
        assert!(err.contains("WHITELISTED_GUILDS"));
        assert!(err.contains("abc"));
        assert!(parse_id_list("X", "0").is_err());
    }
}
