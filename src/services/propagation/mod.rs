//! Ban report propagation.
//!
//! A ban in a network guild moves through these phases:
//!
//! 1. `intake`: the ban event becomes a report/ignore prompt in the origin
//!    guild's moderation channel.
//! 2. The evidence form collects a rationale, text and attachment links;
//!    `evidence` downloads the attachments for re-upload.
//! 3. `fanout`: the finished report goes to every set-up guild that has not
//!    seen the account, each guild remembering the account once handled.
//! 4. `quick_action`: receiving guilds can ban from the report, or unban
//!    from a later false report notice.

pub mod evidence;
pub mod fanout;
pub mod intake;
pub mod quick_action;
pub mod report;

pub use fanout::{propagate_broadcast, propagate_report, propagate_retraction, FanoutSummary};
pub use intake::{clear_prompt, detect_ban, IntakeOutcome};
pub use quick_action::{ban_reason, quick_ban, quick_unban, QuickActionDenied, QuickActionOutcome};
