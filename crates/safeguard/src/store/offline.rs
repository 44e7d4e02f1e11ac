use async_trait::async_trait;
use tracing::debug;

use super::{ProfileStore, ProfileUpdate};
use crate::error::{Error, Result};
use crate::profile::{EmergencyProfile, PublicSlug};

/// A store that is never reachable.
///
/// Substituted for the real store when it cannot be opened, so that owners
/// still get their cached profile and anonymous viewers still get a page.
#[derive(Debug, Clone)]
pub struct OfflineStore {
    reason: String,
}

impl OfflineStore {
    /// Create an offline store that reports `reason` on every operation.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self, operation: &str) -> Result<T> {
        debug!(operation, reason = %self.reason, "Profile store offline");
        Err(Error::unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl ProfileStore for OfflineStore {
    async fn save_profile(&self, _profile: &EmergencyProfile) -> Result<()> {
        self.fail("save_profile")
    }

    async fn get_profile_by_user_id(&self, _user_id: &str) -> Result<Option<EmergencyProfile>> {
        self.fail("get_profile_by_user_id")
    }

    async fn get_profile_by_public_url(
        &self,
        _slug: &PublicSlug,
    ) -> Result<Option<EmergencyProfile>> {
        self.fail("get_profile_by_public_url")
    }

    async fn update_profile(&self, _id: &str, _update: ProfileUpdate) -> Result<()> {
        self.fail("update_profile")
    }

    async fn delete_profile(&self, _id: &str) -> Result<bool> {
        self.fail("delete_profile")
    }
}
