// ============================================================================
// Command gate replies
// ============================================================================

pub const NOT_WHITELISTED: &str = "This server is not part of the network.";

pub const SETUP_REQUIRED: &str =
    "Command could not be executed! Please ask a server administrator to run </setup:0>.";

pub const MISSING_PERMISSION: &str = "You do not have permission to execute this command!";

pub const GUILD_ONLY: &str = "This command must be ran in a guild.";

pub const BUTTON_GUILD_ONLY: &str = "This button must be clicked in a guild.";

pub const EXPIRED_CONTROL: &str = "This control is no longer active.";

// ============================================================================
// Ban reports
// ============================================================================

/// Stands in for an empty evidence field
pub const NO_EVIDENCE: &str = "No evidence provided.";

pub const REPORT_SUBMITTED: &str = "Submitted ban report to network!";

pub const IGNORED_BAN: &str = "Ignored ban.";

pub const NOT_REPORTED_BEFORE: &str =
    "Unable to send notification: user ID has not been reported before!";

pub const NOTIFICATIONS_SENT: &str = "Notifications sent!";

// ============================================================================
// Setup
// ============================================================================

pub const SETUP_FIRST_RUN: &str = "Your server is set up!\n\n\
    Before you go, please consider giving this bot the `Ban Members` permission: \
    it allows the \"Ban User\" button on ban reports to work, and allows the bot to \
    check if a reported user is already banned before sending a ban report in this \
    server. This permission is not and will never be required for core functionality.";

pub const SETUP_UPDATED: &str = "Configuration has been updated!";

/// Lines posted (and removed again) by `/status debug`
pub const STATUS_TEST_MESSAGES: &[&str] = &[
    "Get mad!",
    "Don't make lemonade!",
    "Prometheus was punished by the gods for giving the gift of knowledge to man. \
     He was cast into the bowels of the earth and pecked by birds.",
    "It won't be enough.",
    "The answer is beneath us.",
    "Her name is Caroline.",
    "Remember that!",
    "That's all I can say.",
];
