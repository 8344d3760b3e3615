use std::sync::Arc;

use tracing::{debug, info};

use crate::bot::error::Error;
use crate::config::Settings;
use crate::services::callbacks::{
    ButtonCallback, CallbackKind, CallbackRegistry, CallbackToken, FormCallback,
};
use crate::services::mod_channel::resolve_mod_channel;
use crate::services::platform::{ChatPlatform, Notice};
use crate::services::propagation::report::PendingBan;
use crate::store::GuildStore;

/// Why a ban event did or did not produce a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Guild is not part of the network
    NotWhitelisted,
    /// Account was already reported to (or handled in) this guild
    AlreadySeen,
    /// A prompt for this ban is still waiting on a moderator
    AlreadyPending,
    /// The guild has no usable moderation channel
    NoModChannel,
    /// Report/ignore prompt posted
    Prompted,
}

/// Turn a ban notification into a report-or-ignore prompt in the origin guild
pub async fn detect_ban<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    settings: &Settings,
    callbacks: &CallbackRegistry,
    pending: PendingBan,
) -> Result<IntakeOutcome, Error> {
    let guild_id = pending.origin_guild;
    let account = pending.account;

    if !settings.is_whitelisted(guild_id) {
        return Ok(IntakeOutcome::NotWhitelisted);
    }

    if store.get(guild_id).has_seen(account) {
        debug!("Ban of {} in guild {} was already seen", account, guild_id);
        return Ok(IntakeOutcome::AlreadySeen);
    }

    let Some(channel_id) = resolve_mod_channel(platform, store, guild_id).await else {
        debug!("No mod channel for guild {}, not prompting", guild_id);
        return Ok(IntakeOutcome::NoModChannel);
    };

    // The report button doubles as the "prompt is pending" marker
    let pending = Arc::new(pending);
    let report_token = CallbackToken::report(account, guild_id);
    if !callbacks.register_button(report_token, ButtonCallback::Report(pending.clone())) {
        return Ok(IntakeOutcome::AlreadyPending);
    }
    callbacks.register_button(
        CallbackToken::ignore(account, guild_id),
        ButtonCallback::Ignore(pending.clone()),
    );
    callbacks.register_form(
        CallbackToken::report_form(account, guild_id),
        FormCallback::ReportEvidence(pending.clone()),
    );

    if let Err(e) = platform.deliver(channel_id, Notice::BanPrompt(&pending)).await {
        clear_prompt(callbacks, &pending);
        platform
            .log_error(
                Some(guild_id),
                &format!(
                    "Failed to post ban prompt for {} in channel {}: {}",
                    account, channel_id, e
                ),
            )
            .await;
        return Err(e);
    }

    info!(
        "Prompted guild {} to report ban of {} ({})",
        guild_id, pending.account_tag, account
    );
    Ok(IntakeOutcome::Prompted)
}

/// Drop the controls of a prompt once it has been answered
pub fn clear_prompt(callbacks: &CallbackRegistry, pending: &PendingBan) {
    let account = pending.account;
    let guild_id = pending.origin_guild;
    callbacks.unregister(CallbackKind::Button, &CallbackToken::report(account, guild_id));
    callbacks.unregister(CallbackKind::Button, &CallbackToken::ignore(account, guild_id));
    callbacks.unregister(CallbackKind::Form, &CallbackToken::report_form(account, guild_id));
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serenity::all::{ChannelId, GuildId, Permissions, UserId};

    use super::*;
    use crate::services::testing::{Delivered, FakeGuild, FakePlatform};

    const POST: Permissions = Permissions::VIEW_CHANNEL.union(Permissions::SEND_MESSAGES);

    fn pending(account: u64, guild: u64) -> PendingBan {
        PendingBan {
            account: UserId::new(account),
            account_tag: "spammer".to_string(),
            origin_guild: GuildId::new(guild),
            origin_name: "Origin".to_string(),
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: GuildStore,
        settings: Settings,
        callbacks: CallbackRegistry,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = GuildStore::new(dir.path());
        store
            .update(GuildId::new(1), |r| {
                r.first_time_setup = true;
                r.mod_channel = Some(ChannelId::new(10));
            })
            .unwrap();
        Fixture {
            _dir: dir,
            store,
            settings: Settings::for_tests(&[1]),
            callbacks: CallbackRegistry::new(Duration::from_secs(3600)),
        }
    }

    fn platform() -> FakePlatform {
        FakePlatform::new().with_guild(FakeGuild::new(1, "A").channel(10, POST))
    }

    #[tokio::test]
    async fn test_prompts_once() {
        let f = fixture();
        let platform = platform();

        let first = detect_ban(&platform, &f.store, &f.settings, &f.callbacks, pending(111, 1)).await;
        let second = detect_ban(&platform, &f.store, &f.settings, &f.callbacks, pending(111, 1)).await;

        assert_eq!(tokio_test::assert_ok!(first), IntakeOutcome::Prompted);
        assert_eq!(tokio_test::assert_ok!(second), IntakeOutcome::AlreadyPending);
        assert_eq!(
            platform.delivered_to(10),
            vec![Delivered::Prompt(UserId::new(111))]
        );
        assert!(f.callbacks.contains(
            CallbackKind::Form,
            &CallbackToken::report_form(UserId::new(111), GuildId::new(1))
        ));
    }

    #[tokio::test]
    async fn test_seen_account_is_silent() {
        let f = fixture();
        let platform = platform();
        f.store.claim_seen(GuildId::new(1), UserId::new(111)).unwrap();

        let outcome = detect_ban(&platform, &f.store, &f.settings, &f.callbacks, pending(111, 1))
            .await
            .unwrap();

        assert_eq!(outcome, IntakeOutcome::AlreadySeen);
        assert!(platform.deliveries().is_empty());
        assert!(f.callbacks.is_empty());
    }

    #[tokio::test]
    async fn test_unlisted_guild_ignored() {
        let f = fixture();
        let platform = platform().with_guild(FakeGuild::new(2, "B").channel(20, POST));

        let outcome = detect_ban(&platform, &f.store, &f.settings, &f.callbacks, pending(111, 2))
            .await
            .unwrap();

        assert_eq!(outcome, IntakeOutcome::NotWhitelisted);
        assert!(platform.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_unusable_channel_is_silent() {
        let f = fixture();
        let platform = FakePlatform::new().with_guild(FakeGuild::new(1, "A"));

        let outcome = detect_ban(&platform, &f.store, &f.settings, &f.callbacks, pending(111, 1))
            .await
            .unwrap();

        assert_eq!(outcome, IntakeOutcome::NoModChannel);
        assert!(platform.logs().is_empty());
    }

    #[tokio::test]
    async fn test_failed_prompt_releases_controls() {
        let f = fixture();
        let platform = platform().failing_channel(10);

        let result = detect_ban(&platform, &f.store, &f.settings, &f.callbacks, pending(111, 1)).await;

        tokio_test::assert_err!(result);
        assert!(f.callbacks.is_empty());

        let logs = platform.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].0, Some(GuildId::new(1)));
        assert!(logs[0].1.contains("111"));
    }

    #[tokio::test]
    async fn test_cleared_prompt_can_be_posted_again() {
        let f = fixture();
        let platform = platform();
        detect_ban(&platform, &f.store, &f.settings, &f.callbacks, pending(111, 1))
            .await
            .unwrap();

        clear_prompt(&f.callbacks, &pending(111, 1));
        assert!(f.callbacks.is_empty());

        let outcome = detect_ban(&platform, &f.store, &f.settings, &f.callbacks, pending(111, 1))
            .await
            .unwrap();
        assert_eq!(outcome, IntakeOutcome::Prompted);
        assert_eq!(platform.delivered_to(10).len(), 2);
    }
}
