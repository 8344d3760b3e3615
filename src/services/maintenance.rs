use std::sync::Arc;
use std::time::Duration;

use serenity::all::{ActivityData, Context};
use tokio::time::interval;
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::constants::limits::{CALLBACK_SWEEP_INTERVAL_SECONDS, PRESENCE_INTERVAL_SECONDS};

/// Presence line for a guild count
pub fn presence_text(guild_count: usize) -> String {
    if guild_count == 1 {
        "1 server".to_string()
    } else {
        format!("{} servers", guild_count)
    }
}

/// Keep the "Listening to N servers" presence current
pub fn spawn_presence_updater(ctx: Context) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(PRESENCE_INTERVAL_SECONDS));

        loop {
            ticker.tick().await;

            let count = ctx.cache.guild_count();
            ctx.set_activity(Some(ActivityData::listening(presence_text(count))));
            debug!("Presence updated for {} guilds", count);
        }
    });
}

/// Drop buttons and forms nobody answered within the configured lifetime
pub fn spawn_callback_sweeper(data: Arc<Data>) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(CALLBACK_SWEEP_INTERVAL_SECONDS));

        loop {
            ticker.tick().await;

            let evicted = data.callbacks.evict_expired();
            if evicted > 0 {
                info!(
                    "Evicted {} expired callbacks, {} still active",
                    evicted,
                    data.callbacks.len()
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_text() {
        assert_eq!(presence_text(0), "0 servers");
        assert_eq!(presence_text(1), "1 server");
        assert_eq!(presence_text(42), "42 servers");
    }
}
