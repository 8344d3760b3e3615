use std::sync::Arc;

use serenity::all::Permissions;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::messages::{MISSING_PERMISSION, NOT_WHITELISTED, SETUP_REQUIRED};
use crate::utils::permissions::{maybe_has_permission_level, PermissionLevel};

pub mod info;
pub mod notify;
pub mod purge;
pub mod registration;
pub mod request;
pub mod serverlist;
pub mod setup;
pub mod status;

pub type Command = poise::Command<Arc<Data>, Error>;

/// Where a command is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Per guild, depending on whitelist and setup state
    Guild,
    /// Once, for every guild and DMs
    Global,
}

/// Who may run a command and where it shows up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPolicy {
    pub level: PermissionLevel,
    /// Usable before `/setup` has been run
    pub setup_exempt: bool,
    pub scope: Scope,
}

/// Policy for a top-level command name. Unknown names get the strictest one.
pub fn policy(name: &str) -> CommandPolicy {
    let (level, setup_exempt, scope) = match name {
        "setup" => (PermissionLevel::BanMembers, true, Scope::Guild),
        "notify" | "status" | "purge" | "serverlist" => {
            (PermissionLevel::BanMembers, false, Scope::Guild)
        }
        "request" => (PermissionLevel::Administrator, false, Scope::Guild),
        "info" => (PermissionLevel::Everyone, true, Scope::Global),
        _ => (PermissionLevel::Administrator, false, Scope::Guild),
    };
    CommandPolicy {
        level,
        setup_exempt,
        scope,
    }
}

/// Decide whether a command may run in a guild, returning the one reply
/// to send when it may not. Checked in order: whitelist, setup, permission.
pub fn gate(
    policy: CommandPolicy,
    whitelisted: bool,
    set_up: bool,
    member_permissions: Option<Permissions>,
) -> Result<(), &'static str> {
    if !whitelisted {
        return Err(NOT_WHITELISTED);
    }
    if !set_up && !policy.setup_exempt {
        return Err(SETUP_REQUIRED);
    }
    let open = policy.level == PermissionLevel::Everyone;
    if !open && !maybe_has_permission_level(member_permissions, policy.level) {
        return Err(MISSING_PERMISSION);
    }
    Ok(())
}

pub fn guild_commands() -> Vec<Command> {
    vec![
        setup::setup(),
        notify::notify(),
        status::status(),
        request::request(),
        purge::purge(),
        serverlist::serverlist(),
    ]
}

pub fn global_commands() -> Vec<Command> {
    vec![info::info()]
}

/// Every command the framework dispatches
pub fn all_commands() -> Vec<Command> {
    let mut commands = guild_commands();
    commands.extend(global_commands());
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        assert_eq!(policy("setup").level, PermissionLevel::BanMembers);
        assert!(policy("setup").setup_exempt);
        assert_eq!(policy("request").level, PermissionLevel::Administrator);
        assert_eq!(policy("info").scope, Scope::Global);
        assert_eq!(policy("info").level, PermissionLevel::Everyone);
        assert!(!policy("purge").setup_exempt);
        assert_eq!(policy("nonsense").level, PermissionLevel::Administrator);
    }

    #[test]
    fn test_gate_order() {
        let notify = policy("notify");
        let ban = Some(Permissions::BAN_MEMBERS);

        // Whitelist is checked before anything else
        assert_eq!(gate(notify, false, false, None), Err(NOT_WHITELISTED));
        // Then setup, even for callers without permission
        assert_eq!(gate(notify, true, false, None), Err(SETUP_REQUIRED));
        assert_eq!(
            gate(notify, true, true, Some(Permissions::SEND_MESSAGES)),
            Err(MISSING_PERMISSION)
        );
        assert_eq!(gate(notify, true, true, ban), Ok(()));
    }

    #[test]
    fn test_setup_exempt_commands_run_before_setup() {
        let ban = Some(Permissions::BAN_MEMBERS);
        assert_eq!(gate(policy("setup"), true, false, ban), Ok(()));
        assert_eq!(gate(policy("info"), true, false, None), Ok(()));
        assert_eq!(
            gate(policy("setup"), true, false, Some(Permissions::empty())),
            Err(MISSING_PERMISSION)
        );
    }

    #[test]
    fn test_command_lists_match_policies() {
        for command in guild_commands() {
            assert_eq!(policy(&command.name).scope, Scope::Guild, "{}", command.name);
        }
        for command in global_commands() {
            assert_eq!(policy(&command.name).scope, Scope::Global, "{}", command.name);
        }
    }
}
