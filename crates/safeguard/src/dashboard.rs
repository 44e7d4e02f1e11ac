//! Owner dashboard.
//!
//! The dashboard holds the signed-in owner's profile. It subscribes to the
//! current user when mounted and releases the subscription when unmounted.
//! Loading is gated on a signed-in user and goes through the two-tier
//! lookup, which reads the local cache only when the store is unreachable. Saving carries the identifier, slug and creation time over from
//! the loaded profile, and degrades to the local cache when the store is
//! unreachable.

use std::fmt;

use tracing::{debug, info, warn};

use crate::auth::{AuthProvider, CurrentUser, User};
use crate::cache::profile_key;
use crate::error::{Error, Result};
use crate::lookup::{Lookup, TieredLookup};
use crate::profile::{EmergencyProfile, PrivacySettings, ProfileDetails, Timestamp};
use crate::store::ProfileUpdate;

/// Where a write ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the shared store.
    Stored,
    /// The store was unreachable; written to the local cache instead.
    CachedLocally,
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => write!(f, "saved"),
            Self::CachedLocally => write!(f, "saved to local cache (store unreachable)"),
        }
    }
}

/// The owner's view of their own profile.
#[derive(Debug)]
pub struct Dashboard {
    lookup: TieredLookup,
    user: CurrentUser,
    profile: Option<EmergencyProfile>,
    slug_length: usize,
}

impl Dashboard {
    /// Mount the dashboard, subscribing to `auth`'s current user.
    #[must_use]
    pub fn mount(lookup: TieredLookup, auth: &dyn AuthProvider, slug_length: usize) -> Self {
        Self {
            lookup,
            user: auth.subscribe(),
            profile: None,
            slug_length,
        }
    }

    /// Unmount the dashboard, releasing the current-user subscription.
    pub fn unmount(self) {
        self.user.unsubscribe();
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.user.get()
    }

    /// The loaded profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<&EmergencyProfile> {
        self.profile.as_ref()
    }

    fn signed_in_uid(&self) -> Result<String> {
        self.user.uid().ok_or(Error::NotSignedIn)
    }

    /// Load the signed-in user's profile from the store, or from the local
    /// cache when the store cannot be read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] if nobody is signed in. Store failures
    /// are not errors here.
    pub async fn load_profile(&mut self) -> Result<Option<&EmergencyProfile>> {
        let uid = self.signed_in_uid()?;

        match self.lookup.by_user_id(&uid).await {
            Lookup::Found { profile, source } => {
                debug!(user_id = %uid, %source, "Loaded profile");
                self.profile = Some(profile);
            }
            Lookup::Missing { .. } => {
                debug!(user_id = %uid, "No profile yet");
                if self.profile.as_ref().is_some_and(|p| p.user_id != uid) {
                    self.profile = None;
                }
            }
        }

        Ok(self.profile.as_ref())
    }

    /// Sign in through `auth`, then load the new user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] with the provider's message if sign-in is
    /// rejected.
    pub async fn sign_in(
        &mut self,
        auth: &dyn AuthProvider,
        email: &str,
        password: &str,
    ) -> Result<Option<&EmergencyProfile>> {
        auth.login(email, password).await?;
        info!(email, "Signed in");
        self.profile = None;
        self.load_profile().await
    }

    /// Sign out through `auth` and drop the loaded profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the provider fails to sign out.
    pub async fn sign_out(&mut self, auth: &dyn AuthProvider) -> Result<()> {
        auth.logout().await?;
        info!("Signed out");
        self.profile = None;
        Ok(())
    }

    /// Save submitted `details` as the signed-in user's profile.
    ///
    /// The first save creates the profile with a new id and slug. Later saves
    /// keep the loaded profile's id, slug and creation time. If the store
    /// cannot be written the profile is cached locally; either way it becomes
    /// the dashboard's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, the details are invalid, or
    /// neither the store nor the local cache could be written.
    pub async fn save_profile(&mut self, details: ProfileDetails) -> Result<SaveOutcome> {
        let uid = self.signed_in_uid()?;
        details.validate()?;

        let prior = self.profile.as_ref().filter(|p| p.user_id == uid);
        let profile = EmergencyProfile::assemble(details, &uid, prior, self.slug_length);

        let outcome = match self.lookup.store().save_profile(&profile).await {
            Ok(()) => SaveOutcome::Stored,
            Err(e) => {
                warn!(user_id = %uid, error = %e, "Profile save failed, caching locally");
                self.lookup.cache().store_profile(&profile)?;
                SaveOutcome::CachedLocally
            }
        };

        info!(id = %profile.id, public_url = %profile.public_url, %outcome, "Profile saved");
        self.profile = Some(profile);
        Ok(outcome)
    }

    /// Change the loaded profile's privacy settings.
    ///
    /// Only the privacy block is written. A profile that so far exists only
    /// in the local cache is written to the store in full.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, no profile is loaded, or the
    /// change could not be written anywhere.
    pub async fn update_privacy<F>(&mut self, edit: F) -> Result<SaveOutcome>
    where
        F: FnOnce(&mut PrivacySettings),
    {
        let uid = self.signed_in_uid()?;
        let mut profile = self
            .profile
            .clone()
            .filter(|p| p.user_id == uid)
            .ok_or_else(|| Error::not_found(format!("profile of user {uid}")))?;

        edit(&mut profile.details.privacy);
        profile.updated_at = Timestamp::now();

        let store = self.lookup.store().clone();
        let outcome = match store
            .update_profile(&profile.id, ProfileUpdate::privacy(profile.details.privacy))
            .await
        {
            Ok(()) => SaveOutcome::Stored,
            Err(e) if e.is_not_found() => {
                debug!(id = %profile.id, "Profile not in store yet, writing it in full");
                match store.save_profile(&profile).await {
                    Ok(()) => SaveOutcome::Stored,
                    Err(e) => return self.cache_fallback(profile, &e),
                }
            }
            Err(e) if e.is_unavailable() => return self.cache_fallback(profile, &e),
            Err(e) => return Err(e),
        };

        info!(id = %profile.id, privacy = ?profile.details.privacy, "Privacy settings updated");
        self.profile = Some(profile);
        Ok(outcome)
    }

    fn cache_fallback(&mut self, profile: EmergencyProfile, cause: &Error) -> Result<SaveOutcome> {
        warn!(id = %profile.id, error = %cause, "Profile update failed, caching locally");
        self.lookup.cache().store_profile(&profile)?;
        self.profile = Some(profile);
        Ok(SaveOutcome::CachedLocally)
    }

    /// Delete the signed-in user's profile from the store and the local
    /// cache. Returns whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in or the store or cache could
    /// not be written.
    pub async fn delete_profile(&mut self) -> Result<bool> {
        let uid = self.signed_in_uid()?;

        let mut deleted = false;
        if let Some(profile) = self.profile.take().filter(|p| p.user_id == uid) {
            deleted = self.lookup.store().delete_profile(&profile.id).await?;
        }
        deleted |= self.lookup.cache().remove_item(&profile_key(&uid))?;

        info!(user_id = %uid, deleted, "Profile deleted");
        Ok(deleted)
    }

    /// The loaded profile's share URL (and QR payload) under `base_url`.
    #[must_use]
    pub fn share_url(&self, base_url: &str) -> Option<String> {
        self.profile.as_ref().map(|p| p.share_url(base_url))
    }

    /// Wait for the signed-in user to change, then reload.
    ///
    /// Signing out clears the loaded profile. Returns `false` once the auth
    /// provider has gone away.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Dashboard::load_profile`].
    pub async fn follow_user(&mut self) -> Result<bool> {
        let Some(user) = self.user.changed().await else {
            return Ok(false);
        };

        self.profile = None;
        if user.is_some() {
            self.load_profile().await?;
        }
        Ok(true)
    }
}
