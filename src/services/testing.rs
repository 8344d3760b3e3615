//! In-memory chat platform for exercising the report engine.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId, Permissions, UserId};

use crate::bot::error::Error;
use crate::services::platform::{ChatPlatform, GuildSummary, Notice};

pub const BOT_ID: u64 = 999;

#[derive(Debug, Clone, Default)]
pub struct FakeGuild {
    id: u64,
    name: String,
    bot_permissions: Option<Permissions>,
    members: HashMap<UserId, Permissions>,
    channels: HashMap<ChannelId, Permissions>,
    bans: HashSet<UserId>,
    protected: HashSet<UserId>,
    broken_ban_list: bool,
}

impl FakeGuild {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            bot_permissions: Some(Permissions::empty()),
            ..Default::default()
        }
    }

    pub fn bot(mut self, permissions: Permissions) -> Self {
        self.bot_permissions = Some(permissions);
        self
    }

    pub fn channel(mut self, channel: u64, bot_permissions: Permissions) -> Self {
        self.channels.insert(ChannelId::new(channel), bot_permissions);
        self
    }

    pub fn member(mut self, user: u64, permissions: Permissions) -> Self {
        self.members.insert(UserId::new(user), permissions);
        self
    }

    pub fn banned(mut self, user: u64) -> Self {
        self.bans.insert(UserId::new(user));
        self
    }

    /// Member ranked above the bot
    pub fn protected(mut self, user: u64) -> Self {
        self.members.entry(UserId::new(user)).or_insert(Permissions::empty());
        self.protected.insert(UserId::new(user));
        self
    }

    pub fn broken_ban_list(mut self) -> Self {
        self.broken_ban_list = true;
        self
    }
}

/// What ended up in a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Prompt(UserId),
    Report { account: UserId, evidence: String },
    FalseReport(UserId),
    Broadcast(String),
}

#[derive(Default)]
pub struct FakePlatform {
    guilds: Mutex<Vec<FakeGuild>>,
    failing_channels: HashSet<ChannelId>,
    deliveries: Mutex<Vec<(ChannelId, Delivered)>>,
    logs: Mutex<Vec<(Option<GuildId>, String)>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guild(self, guild: FakeGuild) -> Self {
        self.guilds.lock().unwrap().push(guild);
        self
    }

    /// Sends to this channel fail even though permissions look fine
    pub fn failing_channel(mut self, channel: u64) -> Self {
        self.failing_channels.insert(ChannelId::new(channel));
        self
    }

    pub fn deliveries(&self) -> Vec<(ChannelId, Delivered)> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn delivered_to(&self, channel: u64) -> Vec<Delivered> {
        self.deliveries()
            .into_iter()
            .filter(|(c, _)| *c == ChannelId::new(channel))
            .map(|(_, d)| d)
            .collect()
    }

    pub fn logs(&self) -> Vec<(Option<GuildId>, String)> {
        self.logs.lock().unwrap().clone()
    }

    pub fn is_banned_now(&self, guild: u64, user: u64) -> bool {
        self.with(GuildId::new(guild), |g| g.bans.contains(&UserId::new(user)))
            .unwrap_or(false)
    }

    fn with<R>(&self, guild_id: GuildId, f: impl FnOnce(&mut FakeGuild) -> R) -> Option<R> {
        let mut guilds = self.guilds.lock().unwrap();
        guilds.iter_mut().find(|g| g.id == guild_id.get()).map(f)
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    fn bot_id(&self) -> UserId {
        UserId::new(BOT_ID)
    }

    async fn guilds(&self) -> Result<Vec<GuildSummary>, Error> {
        Ok(self
            .guilds
            .lock()
            .unwrap()
            .iter()
            .map(|g| GuildSummary {
                id: GuildId::new(g.id),
                name: g.name.clone(),
            })
            .collect())
    }

    async fn bot_permissions(&self, guild_id: GuildId) -> Option<Permissions> {
        self.with(guild_id, |g| g.bot_permissions).flatten()
    }

    async fn member_permissions(&self, guild_id: GuildId, user_id: UserId) -> Option<Permissions> {
        self.with(guild_id, |g| g.members.get(&user_id).copied()).flatten()
    }

    async fn bot_channel_permissions(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Option<Permissions> {
        self.with(guild_id, |g| g.channels.get(&channel_id).copied()).flatten()
    }

    async fn is_banned(&self, guild_id: GuildId, user_id: UserId) -> Result<bool, Error> {
        match self.with(guild_id, |g| (g.broken_ban_list, g.bans.contains(&user_id))) {
            Some((true, _)) => Err(Error::custom("ban list unavailable")),
            Some((false, banned)) => Ok(banned),
            None => Err(Error::GuildNotFound(guild_id.get())),
        }
    }

    async fn is_bannable(&self, guild_id: GuildId, user_id: UserId) -> Result<bool, Error> {
        self.with(guild_id, |g| !g.protected.contains(&user_id))
            .ok_or(Error::GuildNotFound(guild_id.get()))
    }

    async fn ban(&self, guild_id: GuildId, user_id: UserId, _reason: &str) -> Result<(), Error> {
        self.with(guild_id, |g| {
            g.bans.insert(user_id);
        })
        .ok_or(Error::GuildNotFound(guild_id.get()))
    }

    async fn unban(&self, guild_id: GuildId, user_id: UserId) -> Result<(), Error> {
        self.with(guild_id, |g| {
            g.bans.remove(&user_id);
        })
        .ok_or(Error::GuildNotFound(guild_id.get()))
    }

    async fn deliver(&self, channel_id: ChannelId, notice: Notice<'_>) -> Result<(), Error> {
        if self.failing_channels.contains(&channel_id) {
            return Err(Error::custom("Missing Access"));
        }
        let delivered = match notice {
            Notice::BanPrompt(pending) => Delivered::Prompt(pending.account),
            Notice::BanReport(report) => Delivered::Report {
                account: report.account,
                evidence: report.evidence_text.clone(),
            },
            Notice::FalseReport(retraction) => Delivered::FalseReport(retraction.account),
            Notice::Broadcast(broadcast) => Delivered::Broadcast(broadcast.message.clone()),
        };
        self.deliveries.lock().unwrap().push((channel_id, delivered));
        Ok(())
    }

    async fn log_error(&self, guild_id: Option<GuildId>, message: &str) {
        self.logs.lock().unwrap().push((guild_id, message.to_string()));
    }
}
