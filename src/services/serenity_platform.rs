use std::collections::HashMap;

use async_trait::async_trait;
use serenity::all::{
    ChannelId, ChannelType, Context, GuildChannel, GuildId, Member, Permissions, Role, RoleId,
    UserId, UserPagination,
};
use tracing::{debug, error, warn};

use crate::bot::error::Error;
use crate::components::notices;
use crate::services::platform::{ChatPlatform, GuildSummary, Notice};
use crate::services::remote_log;
use crate::utils::permissions::apply_overwrites;

/// Roles and owner of a guild, copied out of the cache or fetched
struct GuildShape {
    owner_id: UserId,
    roles: HashMap<RoleId, Role>,
}

impl GuildShape {
    fn base_permissions(&self, guild_id: GuildId, member: &Member) -> Permissions {
        if member.user.id == self.owner_id {
            return Permissions::all();
        }
        let everyone = self
            .roles
            .get(&RoleId::new(guild_id.get()))
            .map(|role| role.permissions)
            .unwrap_or_else(Permissions::empty);
        let permissions = member
            .roles
            .iter()
            .filter_map(|id| self.roles.get(id))
            .fold(everyone, |acc, role| acc | role.permissions);
        if permissions.administrator() {
            Permissions::all()
        } else {
            permissions
        }
    }

    fn highest_position(&self, member: &Member) -> u16 {
        member
            .roles
            .iter()
            .filter_map(|id| self.roles.get(id))
            .map(|role| role.position)
            .max()
            .unwrap_or(0)
    }
}

/// `ChatPlatform` backed by the live gateway connection
pub struct SerenityPlatform<'a> {
    ctx: &'a Context,
    log_channel: Option<ChannelId>,
}

impl<'a> SerenityPlatform<'a> {
    pub fn new(ctx: &'a Context, log_channel: Option<ChannelId>) -> Self {
        Self { ctx, log_channel }
    }

    async fn shape(&self, guild_id: GuildId) -> Option<GuildShape> {
        let cached = self.ctx.cache.guild(guild_id).map(|guild| GuildShape {
            owner_id: guild.owner_id,
            roles: guild.roles.clone(),
        });
        if cached.is_some() {
            return cached;
        }

        match guild_id.to_partial_guild(self.ctx).await {
            Ok(guild) => Some(GuildShape {
                owner_id: guild.owner_id,
                roles: guild.roles,
            }),
            Err(e) => {
                debug!("Could not fetch guild {}: {}", guild_id, e);
                None
            }
        }
    }

    async fn member(&self, guild_id: GuildId, user_id: UserId) -> Option<Member> {
        let cached = self
            .ctx
            .cache
            .guild(guild_id)
            .and_then(|guild| guild.members.get(&user_id).cloned());
        if cached.is_some() {
            return cached;
        }
        guild_id.member(self.ctx, user_id).await.ok()
    }

    async fn text_channel(&self, guild_id: GuildId, channel_id: ChannelId) -> Option<GuildChannel> {
        let cached = self
            .ctx
            .cache
            .guild(guild_id)
            .and_then(|guild| guild.channels.get(&channel_id).cloned());
        let channel = match cached {
            Some(channel) => channel,
            None => channel_id.to_channel(self.ctx).await.ok()?.guild()?,
        };

        let is_text = matches!(channel.kind, ChannelType::Text | ChannelType::News);
        (channel.guild_id == guild_id && is_text).then_some(channel)
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform<'_> {
    fn bot_id(&self) -> UserId {
        self.ctx.cache.current_user().id
    }

    async fn guilds(&self) -> Result<Vec<GuildSummary>, Error> {
        Ok(self
            .ctx
            .cache
            .guilds()
            .into_iter()
            .map(|id| GuildSummary {
                id,
                name: id.name(&self.ctx.cache).unwrap_or_else(|| id.to_string()),
            })
            .collect())
    }

    async fn bot_permissions(&self, guild_id: GuildId) -> Option<Permissions> {
        self.member_permissions(guild_id, self.bot_id()).await
    }

    async fn member_permissions(&self, guild_id: GuildId, user_id: UserId) -> Option<Permissions> {
        let member = self.member(guild_id, user_id).await?;
        let shape = self.shape(guild_id).await?;
        Some(shape.base_permissions(guild_id, &member))
    }

    async fn bot_channel_permissions(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Option<Permissions> {
        let channel = self.text_channel(guild_id, channel_id).await?;
        let member = self.member(guild_id, self.bot_id()).await?;
        let shape = self.shape(guild_id).await?;
        let base = shape.base_permissions(guild_id, &member);
        Some(apply_overwrites(
            base,
            guild_id,
            member.user.id,
            &member.roles,
            &channel.permission_overwrites,
        ))
    }

    async fn is_banned(&self, guild_id: GuildId, user_id: UserId) -> Result<bool, Error> {
        // Bans are listed in id order: the first one after `user_id - 1`
        // is either the account itself or someone else
        let after = user_id
            .get()
            .checked_sub(1)
            .filter(|id| *id != 0)
            .map(|id| UserPagination::After(UserId::new(id)));
        let bans = guild_id.bans(&self.ctx.http, after, Some(1)).await?;
        Ok(bans.first().is_some_and(|ban| ban.user.id == user_id))
    }

    async fn is_bannable(&self, guild_id: GuildId, user_id: UserId) -> Result<bool, Error> {
        let Some(target) = self.member(guild_id, user_id).await else {
            // Not a member: anyone can be banned by id
            return Ok(true);
        };
        let bot = self
            .member(guild_id, self.bot_id())
            .await
            .ok_or(Error::UserNotFound(self.bot_id().get()))?;
        let shape = self
            .shape(guild_id)
            .await
            .ok_or(Error::GuildNotFound(guild_id.get()))?;

        if user_id == shape.owner_id {
            return Ok(false);
        }
        Ok(shape.highest_position(&bot) > shape.highest_position(&target))
    }

    async fn ban(&self, guild_id: GuildId, user_id: UserId, reason: &str) -> Result<(), Error> {
        guild_id
            .ban_with_reason(&self.ctx.http, user_id, 0, reason)
            .await?;
        Ok(())
    }

    async fn unban(&self, guild_id: GuildId, user_id: UserId) -> Result<(), Error> {
        guild_id.unban(&self.ctx.http, user_id).await?;
        Ok(())
    }

    async fn deliver(&self, channel_id: ChannelId, notice: Notice<'_>) -> Result<(), Error> {
        channel_id
            .send_message(self.ctx, notices::render(notice))
            .await?;
        debug!("Sent {} to channel {}", notice.label(), channel_id);
        Ok(())
    }

    async fn log_error(&self, guild_id: Option<GuildId>, message: &str) {
        match guild_id {
            Some(guild_id) => error!("[guild {}] {}", guild_id, message),
            None => error!("{}", message),
        }

        let Some(log_channel) = self.log_channel else {
            return;
        };
        if let Err(e) = log_channel
            .send_message(self.ctx, remote_log::error_message(guild_id, message))
            .await
        {
            warn!("Could not post to log channel {}: {}", log_channel, e);
        }
    }
}
