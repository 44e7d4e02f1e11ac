//! Local fallback cache.
//!
//! A keyed text store kept on the local machine, holding one serialized
//! profile per user under the key `profile_{userId}`. It is written when the
//! shared store cannot be reached and read when a lookup against the shared
//! store fails or finds nothing.
//!
//! Reads are best-effort: a missing entry, an unreadable entry and a broken
//! cache file all look like "no cached profile". They are logged, never
//! returned as errors.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::profile::{EmergencyProfile, PublicSlug};

/// Prefix of every profile entry's key.
pub const PROFILE_KEY_PREFIX: &str = "profile_";

const CREATE_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// The cache key for `user_id`'s profile.
#[must_use]
pub fn profile_key(user_id: &str) -> String {
    format!("{PROFILE_KEY_PREFIX}{user_id}")
}

/// Local key/value cache of profiles.
#[derive(Debug)]
pub struct LocalCache {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl LocalCache {
    /// Open or create a cache file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute(CREATE_ENTRIES_TABLE, [])?;

        debug!("Local cache opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory cache.
    ///
    /// Also used when the cache file cannot be opened, so the fallback tier
    /// is always present even if it starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        conn.execute(CREATE_ENTRIES_TABLE, [])?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("local cache lock poisoned"))
    }

    /// Store a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            r"
            INSERT INTO entries (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
            params![key, value],
        )?;
        Ok(())
    }

    /// Read a raw value.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Remove a value. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()?
            .execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    /// All keys, in the order they were first written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read.
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM entries ORDER BY rowid ASC")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Cache `profile` under its owner's key.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be serialized or written.
    pub fn store_profile(&self, profile: &EmergencyProfile) -> Result<()> {
        let value = serde_json::to_string(profile)?;
        self.set_item(&profile_key(&profile.user_id), &value)?;
        info!(user_id = %profile.user_id, "Cached profile locally");
        Ok(())
    }

    /// The cached profile for `user_id`, if there is a readable one.
    #[must_use]
    pub fn load_profile(&self, user_id: &str) -> Option<EmergencyProfile> {
        let key = profile_key(user_id);
        match self.get_item(&key) {
            Ok(Some(value)) => parse_entry(&key, &value),
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Local cache unreadable");
                None
            }
        }
    }

    /// The first cached profile published under `slug`, scanning profile
    /// entries in key order.
    #[must_use]
    pub fn find_by_public_url(&self, slug: &PublicSlug) -> Option<EmergencyProfile> {
        let keys = match self.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Local cache unreadable");
                return None;
            }
        };

        keys.iter()
            .filter(|key| key.starts_with(PROFILE_KEY_PREFIX))
            .filter_map(|key| match self.get_item(key) {
                Ok(Some(value)) => parse_entry(key, &value),
                Ok(None) => None,
                Err(e) => {
                    warn!(key = %key, error = %e, "Local cache entry unreadable");
                    None
                }
            })
            .find(|profile| profile.public_url == *slug)
    }
}

fn parse_entry(key: &str, value: &str) -> Option<EmergencyProfile> {
    serde_json::from_str(value)
        .map_err(|e| warn!(key, error = %e, "Skipping malformed cache entry"))
        .ok()
}
