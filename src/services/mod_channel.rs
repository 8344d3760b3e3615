use serenity::all::{ChannelId, GuildId};
use tracing::debug;

use crate::services::platform::ChatPlatform;
use crate::store::GuildStore;
use crate::utils::permissions::can_post;

/// Find a guild's moderation channel, if reports can actually be posted there.
///
/// Never fails: an unfinished setup, a deleted or inaccessible channel and
/// missing view/send permissions all come back as `None`.
pub async fn resolve_mod_channel<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    guild_id: GuildId,
) -> Option<ChannelId> {
    let record = store.get(guild_id);
    if !record.first_time_setup {
        return None;
    }
    let channel_id = record.mod_channel?;

    let Some(permissions) = platform.bot_channel_permissions(guild_id, channel_id).await else {
        debug!("Mod channel {} of guild {} is not reachable", channel_id, guild_id);
        return None;
    };

    if !can_post(permissions) {
        debug!(
            "Missing view/send permissions in mod channel {} of guild {}",
            channel_id, guild_id
        );
        return None;
    }

    Some(channel_id)
}

#[cfg(test)]
mod tests {
    use serenity::all::Permissions;

    use super::*;
    use crate::services::testing::{FakeGuild, FakePlatform};

    const POST: Permissions = Permissions::VIEW_CHANNEL.union(Permissions::SEND_MESSAGES);

    fn setup(store: &GuildStore, guild: u64, channel: u64) {
        store
            .update(GuildId::new(guild), |r| {
                r.first_time_setup = true;
                r.mod_channel = Some(ChannelId::new(channel));
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_resolves_usable_channel() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(FakeGuild::new(1, "A").channel(10, POST));
        setup(&store, 1, 10);

        assert_eq!(
            resolve_mod_channel(&platform, &store, GuildId::new(1)).await,
            Some(ChannelId::new(10))
        );
    }

    #[tokio::test]
    async fn test_requires_setup() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(FakeGuild::new(1, "A").channel(10, POST));
        store
            .update(GuildId::new(1), |r| r.mod_channel = Some(ChannelId::new(10)))
            .unwrap();

        assert_eq!(resolve_mod_channel(&platform, &store, GuildId::new(1)).await, None);
    }

    #[tokio::test]
    async fn test_deleted_channel() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(FakeGuild::new(1, "A"));
        setup(&store, 1, 10);

        assert_eq!(resolve_mod_channel(&platform, &store, GuildId::new(1)).await, None);
    }

    #[tokio::test]
    async fn test_needs_view_and_send() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new()
            .with_guild(FakeGuild::new(1, "A").channel(10, Permissions::VIEW_CHANNEL))
            .with_guild(FakeGuild::new(2, "B").channel(20, Permissions::SEND_MESSAGES));
        setup(&store, 1, 10);
        setup(&store, 2, 20);

        assert_eq!(resolve_mod_channel(&platform, &store, GuildId::new(1)).await, None);
        assert_eq!(resolve_mod_channel(&platform, &store, GuildId::new(2)).await, None);
    }
}
