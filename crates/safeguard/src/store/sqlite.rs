use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::migrations;
use super::{ProfileRecord, ProfileStore, ProfileUpdate};
use crate::error::{Error, Result};
use crate::profile::{EmergencyProfile, PublicSlug, Timestamp};

/// `SQLite`-backed profile store.
///
/// Each profile is one row holding the JSON record, with the owner and slug
/// copied into indexed columns. Lookups return the earliest-inserted match,
/// so duplicate owners or slugs resolve deterministically.
#[derive(Debug)]
pub struct SqliteProfileStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteProfileStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
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

        debug!("Opening profile store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Profile store opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count stored profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
        Ok(count)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("profile store connection lock poisoned"))
    }

    fn write_record(conn: &Connection, record: &ProfileRecord) -> Result<()> {
        let document = record.to_document()?;
        conn.execute(
            r"
            INSERT INTO profiles (id, user_id, public_url, document, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                public_url = excluded.public_url,
                document = excluded.document,
                updated_at = excluded.updated_at
            ",
            params![
                record.id,
                record.user_id,
                record.public_url,
                document,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    fn find_first(&self, column: Lookup, value: &str) -> Result<Option<EmergencyProfile>> {
        let conn = self.conn()?;
        let sql = match column {
            Lookup::Id => "SELECT document FROM profiles WHERE id = ?1",
            Lookup::UserId => {
                "SELECT document FROM profiles WHERE user_id = ?1 ORDER BY rowid ASC LIMIT 1"
            }
            Lookup::PublicUrl => {
                "SELECT document FROM profiles WHERE public_url = ?1 ORDER BY rowid ASC LIMIT 1"
            }
        };

        let document: Option<String> = conn
            .query_row(sql, [value], |row| row.get(0))
            .optional()?;

        document
            .map(|doc| ProfileRecord::from_document(&doc).map(EmergencyProfile::from))
            .transpose()
    }
}

#[derive(Debug, Clone, Copy)]
enum Lookup {
    Id,
    UserId,
    PublicUrl,
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn save_profile(&self, profile: &EmergencyProfile) -> Result<()> {
        let record = ProfileRecord::from(profile);
        let conn = self.conn()?;
        Self::write_record(&conn, &record)?;
        info!(id = %record.id, public_url = %record.public_url, "Saved profile");
        Ok(())
    }

    async fn get_profile_by_user_id(&self, user_id: &str) -> Result<Option<EmergencyProfile>> {
        let profile = self.find_first(Lookup::UserId, user_id)?;
        debug!(user_id, found = profile.is_some(), "Looked up profile by owner");
        Ok(profile)
    }

    async fn get_profile_by_public_url(
        &self,
        slug: &PublicSlug,
    ) -> Result<Option<EmergencyProfile>> {
        let profile = self.find_first(Lookup::PublicUrl, slug.as_str())?;
        debug!(public_url = %slug, found = profile.is_some(), "Looked up profile by slug");
        Ok(profile)
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<()> {
        let Some(mut profile) = self.find_first(Lookup::Id, id)? else {
            warn!(id, "Update for unknown profile");
            return Err(Error::not_found(id));
        };

        update.apply_to(&mut profile.details);
        profile.updated_at = Timestamp::now();

        let conn = self.conn()?;
        Self::write_record(&conn, &ProfileRecord::from(&profile))?;
        info!(id, "Updated profile");
        Ok(())
    }

    async fn delete_profile(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM profiles WHERE id = ?1", [id])?;
        if affected > 0 {
            info!(id, "Deleted profile");
        }
        Ok(affected > 0)
    }
}
