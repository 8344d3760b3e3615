use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, Permissions, UserId};

use crate::bot::error::Error;
use crate::services::propagation::report::{BanReport, Broadcast, FalseReport, PendingBan};

/// A guild the bot is a member of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSummary {
    pub id: GuildId,
    pub name: String,
}

/// Something the bot posts into a moderation channel
#[derive(Debug, Clone, Copy)]
pub enum Notice<'a> {
    /// Report-or-ignore prompt in the origin guild
    BanPrompt(&'a PendingBan),
    /// Ban report with a "Ban User" button
    BanReport(&'a BanReport),
    /// Retraction with an "Unban User" button
    FalseReport(&'a FalseReport),
    /// Free-form announcement without controls
    Broadcast(&'a Broadcast),
}

impl Notice<'_> {
    /// Short name used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Notice::BanPrompt(_) => "ban prompt",
            Notice::BanReport(_) => "ban report",
            Notice::FalseReport(_) => "false ban notification",
            Notice::Broadcast(_) => "broadcast",
        }
    }
}

/// Everything the report engine needs from the chat platform.
///
/// Lookups that can fail for ordinary reasons (deleted channel, member
/// left) return `None` rather than an error; only calls whose failure
/// should be surfaced return `Result`.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// The bot's own user id
    fn bot_id(&self) -> UserId;

    /// Every guild the bot is in, in no particular order
    async fn guilds(&self) -> Result<Vec<GuildSummary>, Error>;

    /// Guild-wide permissions of the bot
    async fn bot_permissions(&self, guild_id: GuildId) -> Option<Permissions>;

    /// Guild-wide permissions of a member, `None` if they cannot be fetched
    async fn member_permissions(&self, guild_id: GuildId, user_id: UserId) -> Option<Permissions>;

    /// The bot's permissions in one channel, `None` if the channel is gone,
    /// inaccessible or not a text channel of that guild
    async fn bot_channel_permissions(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Option<Permissions>;

    /// Whether the guild's ban list contains `user_id`
    async fn is_banned(&self, guild_id: GuildId, user_id: UserId) -> Result<bool, Error>;

    /// Whether role hierarchy lets the bot ban `user_id` (true for non-members)
    async fn is_bannable(&self, guild_id: GuildId, user_id: UserId) -> Result<bool, Error>;

    async fn ban(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> Result<(), Error>;

    async fn unban(&self, guild_id: GuildId, user_id: UserId) -> Result<(), Error>;

    /// Post a notice into a channel
    async fn deliver(&self, channel_id: ChannelId, notice: Notice<'_>) -> Result<(), Error>;

    /// Record an operational problem in the text log and the remote log channel
    async fn log_error(&self, guild_id: Option<GuildId>, message: &str);
}
