//! Two-tier profile lookup.
//!
//! Every read goes to the shared store first and to the local cache second,
//! so call sites never special-case a store failure. Owner reads consult the
//! cache only when the store cannot be read: a store miss is final, so a
//! profile deleted elsewhere does not come back from a stale cache entry.
//! Public reads also consult the cache on a store miss, which keeps profiles
//! saved while offline reachable by slug.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::LocalCache;
use crate::error::Error;
use crate::profile::{EmergencyProfile, PublicSlug};
use crate::store::ProfileStore;

/// Where a looked-up profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// The shared profile store.
    Store,
    /// The local fallback cache.
    LocalCache,
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => write!(f, "store"),
            Self::LocalCache => write!(f, "local_cache"),
        }
    }
}

/// Outcome of a two-tier lookup.
#[derive(Debug)]
pub enum Lookup {
    /// A profile was found.
    Found {
        /// The profile.
        profile: EmergencyProfile,
        /// Which tier produced it.
        source: ProfileSource,
    },
    /// Neither tier had a match.
    Missing {
        /// The store error, if the store could not be read.
        store_error: Option<Error>,
    },
}

impl Lookup {
    /// The found profile, if any.
    #[must_use]
    pub fn into_profile(self) -> Option<EmergencyProfile> {
        match self {
            Self::Found { profile, .. } => Some(profile),
            Self::Missing { .. } => None,
        }
    }
}

/// Reads profiles from the store, falling back to the local cache.
#[derive(Clone)]
pub struct TieredLookup {
    store: Arc<dyn ProfileStore>,
    cache: Arc<LocalCache>,
}

impl fmt::Debug for TieredLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredLookup")
            .field("cache", &self.cache.path())
            .finish_non_exhaustive()
    }
}

impl TieredLookup {
    /// Create a lookup over `store` and `cache`.
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>, cache: Arc<LocalCache>) -> Self {
        Self { store, cache }
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// The local cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    /// Look up the profile owned by `user_id`.
    ///
    /// The local cache is read only when the store fails.
    pub async fn by_user_id(&self, user_id: &str) -> Lookup {
        match self.store.get_profile_by_user_id(user_id).await {
            Ok(Some(profile)) => Lookup::Found {
                profile,
                source: ProfileSource::Store,
            },
            Ok(None) => Lookup::Missing { store_error: None },
            Err(e) => {
                warn!(user_id, error = %e, "Profile store read failed, using local cache");
                Self::fall_back(self.cache.load_profile(user_id), Some(e))
            }
        }
    }

    /// Look up the profile published under `slug`.
    ///
    /// The local cache is scanned when the store has no match or fails.
    pub async fn by_public_url(&self, slug: &PublicSlug) -> Lookup {
        let store_error = match self.store.get_profile_by_public_url(slug).await {
            Ok(Some(profile)) => {
                return Lookup::Found {
                    profile,
                    source: ProfileSource::Store,
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!(public_url = %slug, error = %e, "Profile store read failed, using local cache");
                Some(e)
            }
        };

        Self::fall_back(self.cache.find_by_public_url(slug), store_error)
    }

    fn fall_back(cached: Option<EmergencyProfile>, store_error: Option<Error>) -> Lookup {
        match cached {
            Some(profile) => {
                debug!(id = %profile.id, "Profile served from local cache");
                Lookup::Found {
                    profile,
                    source: ProfileSource::LocalCache,
                }
            }
            None => Lookup::Missing { store_error },
        }
    }
}
