use serenity::all::{ChannelId, GuildId, MessageId, User, UserId};

/// Format a user mention
pub fn mention_user(user_id: UserId) -> String {
    format!("<@{}>", user_id)
}

/// Format a channel mention
pub fn mention_channel(channel_id: ChannelId) -> String {
    format!("<#{}>", channel_id)
}

/// Markdown-safe `name` or legacy `name#1234` for a user
pub fn format_user_raw(user: &User) -> String {
    match user.discriminator {
        Some(discriminator) => escape_special_characters(&format!(
            "{}#{:04}",
            user.name, discriminator
        )),
        None => escape_special_characters(&user.name),
    }
}

/// Escape characters Discord would render as markdown
pub fn escape_special_characters(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '~' | '>' | '|' | '-') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Relative timestamp markup for the account behind `user_id`
pub fn account_age(user_id: UserId) -> String {
    format!("<t:{}:R>", user_id.created_at().unix_timestamp())
}

/// Jump link to a message
pub fn message_link(guild_id: GuildId, channel_id: ChannelId, message_id: MessageId) -> String {
    format!(
        "https://discord.com/channels/{}/{}/{}",
        guild_id, channel_id, message_id
    )
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape_special_characters("plain"), "plain");
        assert_eq!(escape_special_characters("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_special_characters("\\`"), "\\\\\\`");
        assert_eq!(escape_special_characters("x-y|z"), "x\\-y\\|z");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("abcdef", 2), "ab");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_message_link() {
        assert_eq!(
            message_link(GuildId::new(1), ChannelId::new(2), MessageId::new(3)),
            "https://discord.com/channels/1/2/3"
        );
    }

    #[test]
    fn test_mentions() {
        assert_eq!(mention_user(UserId::new(42)), "<@42>");
        assert_eq!(mention_channel(ChannelId::new(7)), "<#7>");
    }
}
