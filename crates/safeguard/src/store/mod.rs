//! Profile record store adapter.
//!
//! The [`ProfileStore`] trait is the boundary to the shared document store
//! that holds every user's profile. Implementations translate between the
//! in-memory [`EmergencyProfile`] and the persisted [`ProfileRecord`] shape.
//!
//! - [`SqliteProfileStore`]: the `SQLite`-backed store
//! - [`OfflineStore`]: stands in when the store cannot be reached; every
//!   operation fails so callers take their degraded paths
//!
//! Stores do not retry. A failed operation surfaces as an error and the
//! caller decides whether to fall back to the local cache.

pub mod migrations;
mod offline;
mod record;
pub mod schema;
mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::profile::{EmergencyProfile, PublicSlug};

pub use offline::OfflineStore;
pub use record::{ProfileRecord, ProfileUpdate};
pub use sqlite::SqliteProfileStore;

/// Trait for profile record stores.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Upsert a profile keyed by its id, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    async fn save_profile(&self, profile: &EmergencyProfile) -> Result<()>;

    /// Find the profile owned by `user_id`.
    ///
    /// If several records share the owner, the first in store order wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn get_profile_by_user_id(&self, user_id: &str) -> Result<Option<EmergencyProfile>>;

    /// Find the profile published under `slug`.
    ///
    /// If several records share the slug, the first in store order wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn get_profile_by_public_url(
        &self,
        slug: &PublicSlug,
    ) -> Result<Option<EmergencyProfile>>;

    /// Merge `update` into the stored profile `id` and stamp `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ProfileNotFound`] if no such record exists, or
    /// an error if the store cannot be accessed.
    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<()>;

    /// Delete the profile `id`. Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    async fn delete_profile(&self, id: &str) -> Result<bool>;
}
