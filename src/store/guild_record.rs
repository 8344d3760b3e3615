use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serenity::all::{ChannelId, UserId};

/// Per-guild configuration and dedup state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildRecord {
    /// Destination for reports, set only via `/setup`
    #[serde(deserialize_with = "deserialize_channel")]
    pub mod_channel: Option<ChannelId>,
    /// Gates every guild command that is not setup-exempt
    pub first_time_setup: bool,
    /// Lets members without Ban Members use quick-ban/unban buttons
    pub allow_bans_from_anyone: bool,
    /// Accounts already reported to (or already banned in) this guild
    pub seen_accounts: BTreeSet<UserId>,
}

impl GuildRecord {
    /// Whether `/setup` has completed with a channel configured
    pub fn is_set_up(&self) -> bool {
        self.first_time_setup && self.mod_channel.is_some()
    }

    pub fn has_seen(&self, account: UserId) -> bool {
        self.seen_accounts.contains(&account)
    }

    /// Record `account` as seen, returning false if it already was
    pub fn mark_seen(&mut self, account: UserId) -> bool {
        self.seen_accounts.insert(account)
    }

    /// Forget `account`, returning false if it was not seen
    pub fn forget(&mut self, account: UserId) -> bool {
        self.seen_accounts.remove(&account)
    }
}

/// Older files store an unset channel as `""`
fn deserialize_channel<'de, D>(deserializer: D) -> Result<Option<ChannelId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawChannel {
        Text(String),
        Number(u64),
    }

    let raw = Option::<RawChannel>::deserialize(deserializer)?;
    let id = match raw {
        None => return Ok(None),
        Some(RawChannel::Number(n)) => n,
        Some(RawChannel::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(RawChannel::Text(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid channel id: {}", s)))?,
    };

    Ok((id != 0).then(|| ChannelId::new(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let record = GuildRecord::default();
        assert_eq!(record.mod_channel, None);
        assert!(!record.first_time_setup);
        assert!(!record.allow_bans_from_anyone);
        assert!(record.seen_accounts.is_empty());
        assert!(!record.is_set_up());
    }

    #[test]
    fn test_mark_seen_is_idempotent() {
        let mut record = GuildRecord::default();
        assert!(record.mark_seen(UserId::new(111)));
        assert!(!record.mark_seen(UserId::new(111)));
        assert_eq!(record.seen_accounts.len(), 1);
        assert!(record.forget(UserId::new(111)));
        assert!(!record.forget(UserId::new(111)));
        assert!(!record.has_seen(UserId::new(111)));
    }

    #[test]
    fn test_reads_legacy_file() {
        let json = r#"{
            "mod_channel": "",
            "first_time_setup": false,
            "seen_accounts": ["111", "222"]
        }"#;
        let record: GuildRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.mod_channel, None);
        assert!(!record.allow_bans_from_anyone);
        assert!(record.has_seen(UserId::new(111)));
        assert!(record.has_seen(UserId::new(222)));
    }

    #[test]
    fn test_channel_id_forms() {
        let from_string: GuildRecord = serde_json::from_str(r#"{"mod_channel": "42"}"#).unwrap();
        let from_number: GuildRecord = serde_json::from_str(r#"{"mod_channel": 42}"#).unwrap();
        let from_null: GuildRecord = serde_json::from_str(r#"{"mod_channel": null}"#).unwrap();
        assert_eq!(from_string.mod_channel, Some(ChannelId::new(42)));
        assert_eq!(from_number.mod_channel, Some(ChannelId::new(42)));
        assert_eq!(from_null.mod_channel, None);
        assert!(serde_json::from_str::<GuildRecord>(r#"{"mod_channel": "abc"}"#).is_err());
    }

    #[test]
    fn test_serialized_ids_are_strings() {
        let mut record = GuildRecord {
            mod_channel: Some(ChannelId::new(5)),
            first_time_setup: true,
            ..Default::default()
        };
        record.mark_seen(UserId::new(9));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["mod_channel"], "5");
        assert_eq!(value["seen_accounts"][0], "9");

        let back: GuildRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
