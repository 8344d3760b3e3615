use serenity::all::{CreateAttachment, CreateMessage, GuildId, Timestamp};

use crate::constants::embeds;
use crate::constants::limits::MAX_INLINE_ERROR_LENGTH;

/// Whether a log message fits in an embed field or has to be attached
pub fn fits_inline(message: &str) -> bool {
    message.chars().count() < MAX_INLINE_ERROR_LENGTH
}

/// Error embed for the remote log channel
pub fn error_message(guild_id: Option<GuildId>, message: &str) -> CreateMessage {
    let mut embed = embeds::error_embed()
        .title("Error")
        .timestamp(Timestamp::now());
    if let Some(guild_id) = guild_id {
        embed = embed.field("Guild ID", guild_id.to_string(), false);
    }

    if fits_inline(message) {
        CreateMessage::new().embed(embed.field("Message", message, false))
    } else {
        CreateMessage::new()
            .embed(embed.field("Message", "See attached `message.txt`.", false))
            .add_file(CreateAttachment::bytes(
                message.as_bytes().to_vec(),
                "message.txt",
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_messages_are_attached() {
        assert!(fits_inline("Unable to send ban report"));
        assert!(fits_inline(&"x".repeat(MAX_INLINE_ERROR_LENGTH - 1)));
        assert!(!fits_inline(&"x".repeat(MAX_INLINE_ERROR_LENGTH)));
    }
}
