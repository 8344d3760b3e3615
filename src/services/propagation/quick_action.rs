use std::fmt;

use serenity::all::{GuildId, UserId};
use tracing::{debug, info};

use crate::bot::error::Error;
use crate::constants::limits::MAX_AUDIT_REASON_LENGTH;
use crate::services::platform::ChatPlatform;
use crate::services::propagation::report::{QuickBanContext, QuickUnbanContext};
use crate::store::GuildStore;
use crate::utils::formatting::truncate;
use crate::utils::permissions::{maybe_has_permission_level, PermissionLevel};

/// Why a quick ban or unban was refused. Shown privately to the clicker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickActionDenied {
    TargetIsBot,
    BotMissingBan { target: String },
    CallerMissingBan { target: String },
    AlreadyBanned,
    NotBanned,
    NotBannable { target: String },
}

impl fmt::Display for QuickActionDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuickActionDenied::TargetIsBot => write!(f, "Unable to ban myself!"),
            QuickActionDenied::BotMissingBan { target } => write!(
                f,
                "Unable to ban {}: this bot does not have the `Ban Members` permission!",
                target
            ),
            QuickActionDenied::CallerMissingBan { target } => write!(
                f,
                "Unable to ban {}: you are missing the `Ban Members` permission!",
                target
            ),
            QuickActionDenied::AlreadyBanned => write!(f, "User is already banned in this server!"),
            QuickActionDenied::NotBanned => write!(f, "User is not banned in this server!"),
            QuickActionDenied::NotBannable { target } => {
                write!(f, "Unable to ban {}: they are not bannable!", target)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickActionOutcome {
    Done,
    Denied(QuickActionDenied),
}

/// Audit log reason for a quick ban. Only the rationale is shortened to
/// fit the platform limit; the report link always survives.
pub fn ban_reason(bot_name: &str, rationale: &str, report_link: &str) -> String {
    let frame = format!("Banned by {} - \"\" {}", bot_name, report_link);
    let room = MAX_AUDIT_REASON_LENGTH.saturating_sub(frame.chars().count());
    format!(
        "Banned by {} - \"{}\" {}",
        bot_name,
        truncate(rationale, room),
        report_link
    )
}

/// Privilege checks shared by both actions: bot first, then the caller
async fn check_privileges<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    guild_id: GuildId,
    caller: UserId,
    target: &str,
) -> Result<(), QuickActionDenied> {
    let bot_permissions = platform.bot_permissions(guild_id).await;
    if !maybe_has_permission_level(bot_permissions, PermissionLevel::BanMembers) {
        return Err(QuickActionDenied::BotMissingBan {
            target: target.to_string(),
        });
    }

    if store.get(guild_id).allow_bans_from_anyone {
        return Ok(());
    }
    let caller_permissions = platform.member_permissions(guild_id, caller).await;
    if !maybe_has_permission_level(caller_permissions, PermissionLevel::BanMembers) {
        return Err(QuickActionDenied::CallerMissingBan {
            target: target.to_string(),
        });
    }
    Ok(())
}

/// Ban a reported account in the clicker's guild after re-checking everything
pub async fn quick_ban<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    guild_id: GuildId,
    caller: UserId,
    context: &QuickBanContext,
    reason: &str,
) -> Result<QuickActionOutcome, Error> {
    let target = &context.account_tag;

    if context.account == platform.bot_id() {
        return Ok(QuickActionOutcome::Denied(QuickActionDenied::TargetIsBot));
    }
    if let Err(denied) = check_privileges(platform, store, guild_id, caller, target).await {
        return Ok(QuickActionOutcome::Denied(denied));
    }

    match platform.is_banned(guild_id, context.account).await {
        Ok(true) => return Ok(QuickActionOutcome::Denied(QuickActionDenied::AlreadyBanned)),
        Ok(false) => {}
        Err(e) => debug!("Could not read ban list of guild {}: {}", guild_id, e),
    }

    let bannable = platform
        .is_bannable(guild_id, context.account)
        .await
        .unwrap_or(true);
    if !bannable {
        return Ok(QuickActionOutcome::Denied(QuickActionDenied::NotBannable {
            target: target.clone(),
        }));
    }

    platform.ban(guild_id, context.account, reason).await?;
    info!(
        "{} quick-banned {} ({}) in guild {}",
        caller, target, context.account, guild_id
    );
    Ok(QuickActionOutcome::Done)
}

/// Lift a falsely reported ban in the clicker's guild
pub async fn quick_unban<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    guild_id: GuildId,
    caller: UserId,
    context: &QuickUnbanContext,
) -> Result<QuickActionOutcome, Error> {
    let target = &context.account_tag;

    if let Err(denied) = check_privileges(platform, store, guild_id, caller, target).await {
        return Ok(QuickActionOutcome::Denied(denied));
    }

    let banned = match platform.is_banned(guild_id, context.account).await {
        Ok(banned) => banned,
        Err(e) => {
            debug!("Could not read ban list of guild {}: {}", guild_id, e);
            false
        }
    };
    if !banned {
        return Ok(QuickActionOutcome::Denied(QuickActionDenied::NotBanned));
    }

    platform.unban(guild_id, context.account).await?;
    info!(
        "{} quick-unbanned {} ({}) in guild {}",
        caller, target, context.account, guild_id
    );
    Ok(QuickActionOutcome::Done)
}

#[cfg(test)]
mod tests {
    use serenity::all::Permissions;
    use tokio_test::assert_ok;

    use super::*;
    use crate::services::testing::{FakeGuild, FakePlatform, BOT_ID};

    const GUILD: u64 = 2;
    const CALLER: u64 = 5;
    const TARGET: u64 = 111;

    fn ban_context(account: u64) -> QuickBanContext {
        QuickBanContext {
            account: UserId::new(account),
            account_tag: "raider".to_string(),
            rationale: "spam".to_string(),
        }
    }

    fn unban_context() -> QuickUnbanContext {
        QuickUnbanContext {
            account: UserId::new(TARGET),
            account_tag: "raider".to_string(),
        }
    }

    async fn ban(platform: &FakePlatform, store: &GuildStore, account: u64) -> QuickActionOutcome {
        assert_ok!(
            quick_ban(
                platform,
                store,
                GuildId::new(GUILD),
                UserId::new(CALLER),
                &ban_context(account),
                "reason",
            )
            .await
        )
    }

    fn denied(reason: QuickActionDenied) -> QuickActionOutcome {
        QuickActionOutcome::Denied(reason)
    }

    #[tokio::test]
    async fn test_quick_ban_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(
            FakeGuild::new(GUILD, "B")
                .bot(Permissions::BAN_MEMBERS)
                .member(CALLER, Permissions::BAN_MEMBERS),
        );

        assert_eq!(ban(&platform, &store, TARGET).await, QuickActionOutcome::Done);
        assert!(platform.is_banned_now(GUILD, TARGET));
    }

    #[tokio::test]
    async fn test_bot_permission_checked_before_admin_caller() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new()
            .with_guild(FakeGuild::new(GUILD, "B").member(CALLER, Permissions::ADMINISTRATOR));

        let outcome = ban(&platform, &store, TARGET).await;

        assert_eq!(
            outcome,
            denied(QuickActionDenied::BotMissingBan {
                target: "raider".to_string()
            })
        );
        assert!(!platform.is_banned_now(GUILD, TARGET));
    }

    #[tokio::test]
    async fn test_refuses_to_ban_itself() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(
            FakeGuild::new(GUILD, "B")
                .bot(Permissions::BAN_MEMBERS)
                .member(CALLER, Permissions::BAN_MEMBERS),
        );

        let outcome = ban(&platform, &store, BOT_ID).await;

        assert_eq!(outcome, denied(QuickActionDenied::TargetIsBot));
        assert!(!platform.is_banned_now(GUILD, BOT_ID));
    }

    #[tokio::test]
    async fn test_caller_needs_ban_members_unless_relaxed() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(
            FakeGuild::new(GUILD, "B")
                .bot(Permissions::BAN_MEMBERS)
                .member(CALLER, Permissions::SEND_MESSAGES),
        );

        assert_eq!(
            ban(&platform, &store, TARGET).await,
            denied(QuickActionDenied::CallerMissingBan {
                target: "raider".to_string()
            })
        );

        store
            .update(GuildId::new(GUILD), |r| r.allow_bans_from_anyone = true)
            .unwrap();
        assert_eq!(ban(&platform, &store, TARGET).await, QuickActionOutcome::Done);
    }

    #[tokio::test]
    async fn test_already_banned_and_protected_targets() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(
            FakeGuild::new(GUILD, "B")
                .bot(Permissions::BAN_MEMBERS)
                .member(CALLER, Permissions::BAN_MEMBERS)
                .banned(TARGET)
                .protected(112),
        );

        assert_eq!(
            ban(&platform, &store, TARGET).await,
            denied(QuickActionDenied::AlreadyBanned)
        );
        assert_eq!(
            ban(&platform, &store, 112).await,
            denied(QuickActionDenied::NotBannable {
                target: "raider".to_string()
            })
        );
        assert!(!platform.is_banned_now(GUILD, 112));
    }

    #[tokio::test]
    async fn test_quick_unban() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(
            FakeGuild::new(GUILD, "B")
                .bot(Permissions::BAN_MEMBERS)
                .member(CALLER, Permissions::BAN_MEMBERS)
                .banned(TARGET),
        );
        let guild = GuildId::new(GUILD);
        let caller = UserId::new(CALLER);

        let first = quick_unban(&platform, &store, guild, caller, &unban_context()).await;
        assert_eq!(assert_ok!(first), QuickActionOutcome::Done);
        assert!(!platform.is_banned_now(GUILD, TARGET));

        let second = quick_unban(&platform, &store, guild, caller, &unban_context()).await;
        assert_eq!(assert_ok!(second), denied(QuickActionDenied::NotBanned));
    }

    #[tokio::test]
    async fn test_quick_unban_checks_bot_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        let platform = FakePlatform::new().with_guild(
            FakeGuild::new(GUILD, "B")
                .member(CALLER, Permissions::ADMINISTRATOR)
                .banned(TARGET),
        );

        let outcome = quick_unban(
            &platform,
            &store,
            GuildId::new(GUILD),
            UserId::new(CALLER),
            &unban_context(),
        )
        .await;

        assert!(matches!(
            assert_ok!(outcome),
            QuickActionOutcome::Denied(QuickActionDenied::BotMissingBan { .. })
        ));
        assert!(platform.is_banned_now(GUILD, TARGET));
    }

    #[test]
    fn test_ban_reason() {
        assert_eq!(
            ban_reason("Turret", "raiding", "https://discord.com/channels/1/2/3"),
            "Banned by Turret - \"raiding\" https://discord.com/channels/1/2/3"
        );
        let link = "https://discord.com/channels/123456789012345678/123456789012345678/123456789012345678";
        let long = ban_reason("Oracle Turret", &"r".repeat(500), link);
        assert_eq!(long.chars().count(), MAX_AUDIT_REASON_LENGTH);
        assert!(long.ends_with(&format!("...\" {}", link)));
    }
}
