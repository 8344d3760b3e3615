use std::fmt;

use serenity::all::{GuildId, UserId};
use tracing::{debug, info, warn};

use crate::bot::error::Error;
use crate::config::Settings;
use crate::services::mod_channel::resolve_mod_channel;
use crate::services::platform::{ChatPlatform, GuildSummary, Notice};
use crate::services::propagation::report::{BanReport, Broadcast, FalseReport};
use crate::store::{GuildRecord, GuildStore};
use crate::utils::permissions::{maybe_has_permission_level, PermissionLevel};

/// Where a guild stands before any I/O is done for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    NotSetUp,
    AlreadySeen,
    /// The guild the ban happened in: marked, never sent to
    Origin,
    Candidate,
}

/// Decide what a report run should do with a guild, from its record alone
pub fn eligibility(
    record: &GuildRecord,
    guild_id: GuildId,
    origin: GuildId,
    account: UserId,
) -> Eligibility {
    if !record.first_time_setup {
        Eligibility::NotSetUp
    } else if record.has_seen(account) {
        Eligibility::AlreadySeen
    } else if guild_id == origin {
        Eligibility::Origin
    } else {
        Eligibility::Candidate
    }
}

/// Per-guild results of one fan-out run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutSummary {
    pub delivered: Vec<GuildId>,
    /// Marked seen without a message (origin, or already banned there)
    pub marked: Vec<GuildId>,
    /// No usable moderation channel
    pub unreachable: Vec<GuildId>,
    /// Send or storage failure
    pub failed: Vec<GuildId>,
    pub skipped: usize,
}

impl fmt::Display for FanoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} delivered, {} marked, {} unreachable, {} failed, {} skipped",
            self.delivered.len(),
            self.marked.len(),
            self.unreachable.len(),
            self.failed.len(),
            self.skipped
        )
    }
}

enum Delivery {
    Sent,
    Unreachable,
    Failed,
}

/// Resolve a guild's mod channel and post `notice` there, logging failures.
/// Never fails the caller's loop.
async fn deliver_to_guild<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    guild: &GuildSummary,
    notice: Notice<'_>,
) -> Delivery {
    let problem = format!(
        "Unable to send {} to guild \"{}\" ({}): check channel permissions!",
        notice.label(),
        guild.name,
        guild.id
    );

    let Some(channel_id) = resolve_mod_channel(platform, store, guild.id).await else {
        warn!("{}", problem);
        platform.log_error(Some(guild.id), &problem).await;
        return Delivery::Unreachable;
    };

    match platform.deliver(channel_id, notice).await {
        Ok(()) => Delivery::Sent,
        Err(e) => {
            warn!("{} ({})", problem, e);
            platform.log_error(Some(guild.id), &problem).await;
            Delivery::Failed
        }
    }
}

/// Whether the bot can see that `account` is already banned in a guild.
/// Ban list failures count as "not banned" so the report still goes out.
async fn already_banned<P: ChatPlatform + ?Sized>(
    platform: &P,
    guild_id: GuildId,
    account: UserId,
) -> bool {
    let bot_permissions = platform.bot_permissions(guild_id).await;
    if !maybe_has_permission_level(bot_permissions, PermissionLevel::BanMembers) {
        return false;
    }
    match platform.is_banned(guild_id, account).await {
        Ok(banned) => banned,
        Err(e) => {
            debug!("Could not read ban list of guild {}: {}", guild_id, e);
            false
        }
    }
}

/// Send a ban report to every set-up guild that has not seen the account.
///
/// The origin guild and guilds that already ban the account are marked seen
/// without a message. Guilds without a usable channel are logged and left
/// unmarked so a later report can still reach them once fixed.
pub async fn propagate_report<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    report: &BanReport,
) -> Result<FanoutSummary, Error> {
    let account = report.account;
    let mut summary = FanoutSummary::default();

    for guild in platform.guilds().await? {
        let record = store.get(guild.id);
        match eligibility(&record, guild.id, report.origin_guild, account) {
            Eligibility::NotSetUp | Eligibility::AlreadySeen => {
                summary.skipped += 1;
                continue;
            }
            Eligibility::Origin | Eligibility::Candidate => {}
        }

        // Claiming first keeps concurrent runs for the same account from
        // both delivering here
        match store.claim_seen(guild.id, account) {
            Ok(true) => {}
            Ok(false) => {
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                let problem = format!("Failed to save guild {}: {}", guild.id, e);
                warn!("{}", problem);
                platform.log_error(Some(guild.id), &problem).await;
                summary.failed.push(guild.id);
                continue;
            }
        }

        if guild.id == report.origin_guild || already_banned(platform, guild.id, account).await {
            summary.marked.push(guild.id);
            continue;
        }

        match deliver_to_guild(platform, store, &guild, Notice::BanReport(report)).await {
            Delivery::Sent => summary.delivered.push(guild.id),
            Delivery::Failed => summary.failed.push(guild.id),
            Delivery::Unreachable => {
                if let Err(e) = store.forget_seen(guild.id, account) {
                    warn!("Failed to release claim in guild {}: {}", guild.id, e);
                }
                summary.unreachable.push(guild.id);
            }
        }
    }

    info!(
        "Ban report for {} from guild {}: {}",
        account, report.origin_guild, summary
    );
    Ok(summary)
}

/// Send a false report notice to every set-up guild, forgetting the account
/// wherever the notice arrived
pub async fn propagate_retraction<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    retraction: &FalseReport,
) -> Result<FanoutSummary, Error> {
    let mut summary = FanoutSummary::default();

    for guild in platform.guilds().await? {
        if !store.get(guild.id).first_time_setup {
            summary.skipped += 1;
            continue;
        }

        match deliver_to_guild(platform, store, &guild, Notice::FalseReport(retraction)).await {
            Delivery::Sent => {}
            Delivery::Unreachable => {
                summary.unreachable.push(guild.id);
                continue;
            }
            Delivery::Failed => {
                summary.failed.push(guild.id);
                continue;
            }
        }

        match store.forget_seen(guild.id, retraction.account) {
            Ok(_) => summary.delivered.push(guild.id),
            Err(e) => {
                let problem = format!("Failed to save guild {}: {}", guild.id, e);
                warn!("{}", problem);
                platform.log_error(Some(guild.id), &problem).await;
                summary.failed.push(guild.id);
            }
        }
    }

    info!(
        "False report for {} from guild {}: {}",
        retraction.account, retraction.origin_guild, summary
    );
    Ok(summary)
}

/// Send a free-form message to every set-up guild
pub async fn propagate_broadcast<P: ChatPlatform + ?Sized>(
    platform: &P,
    store: &GuildStore,
    broadcast: &Broadcast,
) -> Result<FanoutSummary, Error> {
    let mut summary = FanoutSummary::default();

    for guild in platform.guilds().await? {
        if !store.get(guild.id).first_time_setup {
            summary.skipped += 1;
            continue;
        }

        match deliver_to_guild(platform, store, &guild, Notice::Broadcast(broadcast)).await {
            Delivery::Sent => summary.delivered.push(guild.id),
            Delivery::Unreachable => summary.unreachable.push(guild.id),
            Delivery::Failed => summary.failed.push(guild.id),
        }
    }

    info!("Broadcast from {}: {}", broadcast.author, summary);
    Ok(summary)
}

/// Why a network notification was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyDenied {
    NotWhitelisted,
    NotReportedBefore,
    NotBroadcaster,
}

impl fmt::Display for NotifyDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyDenied::NotWhitelisted => {
                f.write_str(crate::constants::messages::NOT_WHITELISTED)
            }
            NotifyDenied::NotReportedBefore => {
                f.write_str(crate::constants::messages::NOT_REPORTED_BEFORE)
            }
            NotifyDenied::NotBroadcaster => {
                f.write_str("You are not allowed to broadcast to the network!")
            }
        }
    }
}

/// A false report may only come from a network guild that has seen the account
pub fn check_false_report(
    settings: &Settings,
    store: &GuildStore,
    guild_id: GuildId,
    account: UserId,
) -> Result<(), NotifyDenied> {
    if !settings.is_whitelisted(guild_id) {
        return Err(NotifyDenied::NotWhitelisted);
    }
    if !store.get(guild_id).has_seen(account) {
        return Err(NotifyDenied::NotReportedBefore);
    }
    Ok(())
}

pub fn check_broadcast(settings: &Settings, user_id: UserId) -> Result<(), NotifyDenied> {
    if settings.can_broadcast(user_id) {
        Ok(())
    } else {
        Err(NotifyDenied::NotBroadcaster)
    }
}
