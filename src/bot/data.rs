use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bot::error::Error;
use crate::config::Settings;
use crate::services::callbacks::CallbackRegistry;
use crate::store::GuildStore;

/// Shared data available to all commands and handlers
pub struct Data {
    pub settings: Settings,
    /// Per-guild records, cached in memory and mirrored to disk
    pub store: GuildStore,
    /// Handlers behind the buttons and forms the bot has posted
    pub callbacks: CallbackRegistry,
    /// Used to download evidence attachments
    pub http_client: reqwest::Client,
    pub started_at: Instant,
}

impl Data {
    pub fn new(settings: Settings) -> Result<Self, Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("oracle-turret/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            store: GuildStore::new(settings.data_dir.clone()),
            callbacks: CallbackRegistry::new(settings.callback_ttl),
            http_client,
            started_at: Instant::now(),
            settings,
        })
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("data_dir", &self.settings.data_dir)
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, Error>;
