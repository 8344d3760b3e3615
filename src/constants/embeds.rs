use serenity::all::{Colour, CreateEmbed};

// ============================================================================
// Color Palette - matches the log levels
// ============================================================================

/// Neutral information
pub const INFO_COLOR: Colour = Colour::new(0x2b2d31);

/// Ban reports and other things that need a moderator's attention
pub const WARNING_COLOR: Colour = Colour::new(0xffd700);

/// Errors and retractions
pub const ERROR_COLOR: Colour = Colour::new(0xff0000);

/// Completed actions
pub const SUCCESS_COLOR: Colour = Colour::from_rgb(16, 185, 129);

// ============================================================================
// Status markers
// ============================================================================

pub const CHECK: &str = "✅";
pub const CROSS: &str = "❌";

/// Server list markers: reachable, unreachable, not set up
pub const LIST_OK: &str = "✔";
pub const LIST_BROKEN: &str = "✖";
pub const LIST_UNSET: &str = "—";

// ============================================================================
// Embed Builders
// ============================================================================

/// Create an info/neutral embed
pub fn info_embed() -> CreateEmbed {
    CreateEmbed::new().color(INFO_COLOR)
}

/// Create a warning embed
pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::new().color(WARNING_COLOR)
}

/// Create an error embed
pub fn error_embed() -> CreateEmbed {
    CreateEmbed::new().color(ERROR_COLOR)
}

/// Create a success embed
pub fn success_embed() -> CreateEmbed {
    CreateEmbed::new().color(SUCCESS_COLOR)
}

/// Format a yes/no check for status embeds
pub fn check_mark(ok: bool) -> &'static str {
    if ok {
        CHECK
    } else {
        CROSS
    }
}
