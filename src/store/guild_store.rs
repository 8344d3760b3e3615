use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use serenity::all::{GuildId, UserId};
use tracing::{debug, error, info, warn};

use crate::bot::error::Error;
use crate::store::GuildRecord;

/// Flat-file store of guild records, one JSON file per guild.
///
/// Records are loaded lazily and cached. Every mutation goes through
/// [`GuildStore::update`], which holds the guild's map entry while it
/// mutates and rewrites the file, so concurrent handlers touching the
/// same guild are serialized.
pub struct GuildStore {
    dir: PathBuf,
    records: DashMap<GuildId, GuildRecord>,
}

impl GuildStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            records: DashMap::new(),
        }
    }

    /// Path of the backing file for a guild
    pub fn data_path(&self, guild_id: GuildId) -> PathBuf {
        self.dir.join(format!("{}.json", guild_id))
    }

    /// Snapshot of a guild's record, creating a default one on first access
    pub fn get(&self, guild_id: GuildId) -> GuildRecord {
        self.entry(guild_id).clone()
    }

    /// Read-modify-write a record as one step, then persist it.
    ///
    /// A failed write restores the previous record and returns the error
    /// so the caller can log it for this guild only.
    pub fn update<R>(
        &self,
        guild_id: GuildId,
        mutate: impl FnOnce(&mut GuildRecord) -> R,
    ) -> Result<R, Error> {
        let mut entry = self.entry(guild_id);
        let previous = entry.clone();
        let result = mutate(&mut *entry);
        if let Err(e) = self.write(guild_id, &entry) {
            *entry = previous;
            return Err(e);
        }
        Ok(result)
    }

    /// Atomically mark `account` seen in a guild.
    ///
    /// Returns `Ok(true)` only for the caller that inserted it, which makes
    /// this the compare-and-set behind at-most-once delivery. Nothing is
    /// written when the account was already present, and a failed write
    /// leaves the account unclaimed.
    pub fn claim_seen(&self, guild_id: GuildId, account: UserId) -> Result<bool, Error> {
        let mut entry = self.entry(guild_id);
        if !entry.mark_seen(account) {
            return Ok(false);
        }
        if let Err(e) = self.write(guild_id, &entry) {
            entry.forget(account);
            return Err(e);
        }
        Ok(true)
    }

    /// Remove `account` from a guild's seen set, returning whether it was there
    pub fn forget_seen(&self, guild_id: GuildId, account: UserId) -> Result<bool, Error> {
        let mut entry = self.entry(guild_id);
        if !entry.forget(account) {
            return Ok(false);
        }
        if let Err(e) = self.write(guild_id, &entry) {
            entry.mark_seen(account);
            return Err(e);
        }
        Ok(true)
    }

    /// Flush one guild's current record
    pub fn save(&self, guild_id: GuildId) -> Result<(), Error> {
        let entry = self.entry(guild_id);
        self.write(guild_id, &entry)
    }

    /// Flush every loaded record, continuing past failures
    pub fn save_all(&self) -> usize {
        let mut saved = 0;
        for entry in self.records.iter() {
            match self.write(*entry.key(), entry.value()) {
                Ok(()) => saved += 1,
                Err(e) => error!("Failed to save guild {}: {}", entry.key(), e),
            }
        }
        info!("Saved {} guild records", saved);
        saved
    }

    fn entry(&self, guild_id: GuildId) -> RefMut<'_, GuildId, GuildRecord> {
        self.records
            .entry(guild_id)
            .or_insert_with(|| self.load(guild_id))
    }

    /// Path an unreadable record is moved to before defaults replace it
    pub fn quarantine_path(&self, guild_id: GuildId) -> PathBuf {
        self.dir.join(format!("{}.json.bad", guild_id))
    }

    /// Read a record from disk, falling back to defaults.
    ///
    /// An unreadable file is moved aside first so a later write cannot
    /// overwrite it.
    fn load(&self, guild_id: GuildId) -> GuildRecord {
        let path = self.data_path(guild_id);
        match read_record(&path) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No record for guild {}, using defaults", guild_id);
                GuildRecord::default()
            }
            Err(e) => {
                error!(
                    "Failed to read record for guild {} at {}: {}",
                    guild_id,
                    path.display(),
                    e
                );
                let quarantine = self.quarantine_path(guild_id);
                match fs::rename(&path, &quarantine) {
                    Ok(()) => warn!("Moved unreadable record to {}", quarantine.display()),
                    Err(e) => error!(
                        "Could not move unreadable record {} aside: {}",
                        path.display(),
                        e
                    ),
                }
                GuildRecord::default()
            }
        }
    }

    /// Write to a sibling temp file and rename it over the record
    fn write(&self, guild_id: GuildId, record: &GuildRecord) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(record)?;
        let temp = self.dir.join(format!("{}.json.tmp", guild_id));
        fs::write(&temp, json)?;
        if let Err(e) = fs::rename(&temp, self.data_path(guild_id)) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        debug!("Saved record for guild {}", guild_id);
        Ok(())
    }
}

fn read_record(path: &Path) -> Result<Option<GuildRecord>, Error> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
