use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serenity::all::{GuildId, UserId};
use tracing::debug;

use crate::services::propagation::report::{PendingBan, QuickBanContext, QuickUnbanContext};

/// Opaque custom id carried by a button or modal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallbackToken(String);

impl CallbackToken {
    /// "Report" button on a fresh ban prompt
    pub fn report(account: UserId, guild_id: GuildId) -> Self {
        Self(format!("{}_{}_report_btn", account, guild_id))
    }

    /// "Ignore" button on a fresh ban prompt
    pub fn ignore(account: UserId, guild_id: GuildId) -> Self {
        Self(format!("{}_{}_ignore_btn", account, guild_id))
    }

    /// Evidence form opened by the "Report" button
    pub fn report_form(account: UserId, guild_id: GuildId) -> Self {
        Self(format!("{}_{}_report_btn_modal", account, guild_id))
    }

    /// "Ban User" button on a delivered report
    pub fn quick_ban(account: UserId) -> Self {
        Self(format!("{}_quick_ban_btn", account))
    }

    /// "Unban User" button on a false report notice
    pub fn quick_unban(account: UserId) -> Self {
        Self(format!("{}_quick_unban_btn", account))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CallbackToken {
    fn from(custom_id: &str) -> Self {
        Self(custom_id.to_string())
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a button press should do
#[derive(Debug, Clone)]
pub enum ButtonCallback {
    Report(Arc<PendingBan>),
    Ignore(Arc<PendingBan>),
    QuickBan(Arc<QuickBanContext>),
    QuickUnban(Arc<QuickUnbanContext>),
}

/// What a modal submission should do
#[derive(Debug, Clone)]
pub enum FormCallback {
    ReportEvidence(Arc<PendingBan>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Button,
    Form,
}

struct Registration<T> {
    callback: T,
    registered_at: Instant,
}

/// One token namespace; first registration wins until it expires
struct Slots<T> {
    entries: DashMap<CallbackToken, Registration<T>>,
}

impl<T: Clone> Slots<T> {
    fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    fn register(&self, token: CallbackToken, callback: T, ttl: Duration) -> bool {
        let registration = Registration {
            callback,
            registered_at: Instant::now(),
        };
        match self.entries.entry(token) {
            Entry::Occupied(mut existing) if existing.get().registered_at.elapsed() >= ttl => {
                existing.insert(registration);
                true
            }
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(registration);
                true
            }
        }
    }

    fn get(&self, token: &CallbackToken, ttl: Duration) -> Option<T> {
        self.entries
            .get(token)
            .filter(|r| r.registered_at.elapsed() < ttl)
            .map(|r| r.callback.clone())
    }

    fn remove(&self, token: &CallbackToken) -> bool {
        self.entries.remove(token).is_some()
    }

    fn evict(&self, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, r| r.registered_at.elapsed() < ttl);
        before - self.entries.len()
    }
}

/// Maps the custom ids of live buttons and forms to the context that
/// produced them, so a later click lands back on the right report.
pub struct CallbackRegistry {
    buttons: Slots<ButtonCallback>,
    forms: Slots<FormCallback>,
    ttl: Duration,
}

impl CallbackRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            buttons: Slots::new(),
            forms: Slots::new(),
            ttl,
        }
    }

    /// Register a button; a live duplicate token is left untouched
    pub fn register_button(&self, token: CallbackToken, callback: ButtonCallback) -> bool {
        let added = self.buttons.register(token.clone(), callback, self.ttl);
        if !added {
            debug!("Button {} already registered", token);
        }
        added
    }

    /// Register a form; a live duplicate token is left untouched
    pub fn register_form(&self, token: CallbackToken, callback: FormCallback) -> bool {
        let added = self.forms.register(token.clone(), callback, self.ttl);
        if !added {
            debug!("Form {} already registered", token);
        }
        added
    }

    /// Look up the handler for a pressed button
    pub fn button(&self, token: &CallbackToken) -> Option<ButtonCallback> {
        self.buttons.get(token, self.ttl)
    }

    /// Look up the handler for a submitted form
    pub fn form(&self, token: &CallbackToken) -> Option<FormCallback> {
        self.forms.get(token, self.ttl)
    }

    pub fn contains(&self, kind: CallbackKind, token: &CallbackToken) -> bool {
        match kind {
            CallbackKind::Button => self.buttons.get(token, self.ttl).is_some(),
            CallbackKind::Form => self.forms.get(token, self.ttl).is_some(),
        }
    }

    pub fn unregister(&self, kind: CallbackKind, token: &CallbackToken) -> bool {
        match kind {
            CallbackKind::Button => self.buttons.remove(token),
            CallbackKind::Form => self.forms.remove(token),
        }
    }

    /// Drop every registration older than the TTL
    pub fn evict_expired(&self) -> usize {
        self.buttons.evict(self.ttl) + self.forms.evict(self.ttl)
    }

    pub fn len(&self) -> usize {
        self.buttons.entries.len() + self.forms.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
