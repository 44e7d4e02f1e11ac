//! Anonymous public view of a profile.
//!
//! A viewer arrives with the path segment that follows `/u/`. The
//! [`PublicResolver`] turns it back into a slug, finds the profile through
//! the two-tier lookup and reports one of the [`ViewState`]s. Resolution never
//! fails towards the viewer: every problem ends as `NotFound` or `Failed`,
//! and both render the same safety page.
//!
//! Privacy filtering happens in [`PublicProfile::project`], applied when the
//! found profile is rendered.

mod projection;
mod render;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

pub use projection::{DoctorInfo, PublicContact, PublicProfile};
pub use render::{
    render_loading, render_not_found, render_profile, safety_message, NOT_FOUND_TITLE,
};

use crate::lookup::{Lookup, TieredLookup};
use crate::profile::{EmergencyProfile, PublicSlug};

/// What the public view is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// A resolution is in flight.
    Loading,
    /// The profile was found.
    Found(Box<EmergencyProfile>),
    /// No profile matches the segment, or the segment is missing or malformed.
    NotFound,
    /// The store could not be read and the local cache had no match.
    Failed {
        /// Operator-facing description of the failure.
        reason: String,
    },
}

impl ViewState {
    /// Whether resolution has finished.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// The found profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<&EmergencyProfile> {
        match self {
            Self::Found(profile) => Some(profile),
            _ => None,
        }
    }

    /// Render this state as the page a viewer sees.
    #[must_use]
    pub fn render(&self, today: NaiveDate, emergency_numbers: &[String]) -> String {
        match self {
            Self::Loading => render_loading(),
            Self::Found(profile) => render_profile(&PublicProfile::project(profile, today)),
            Self::NotFound | Self::Failed { .. } => render_not_found(emergency_numbers),
        }
    }
}

/// Resolves public path segments to profiles.
#[derive(Debug, Clone)]
pub struct PublicResolver {
    lookup: TieredLookup,
}

impl PublicResolver {
    /// Create a resolver over `lookup`.
    #[must_use]
    pub fn new(lookup: TieredLookup) -> Self {
        Self { lookup }
    }

    /// Resolve the segment after `/u/`.
    ///
    /// Never returns [`ViewState::Loading`].
    pub async fn resolve(&self, segment: Option<&str>) -> ViewState {
        let Some(raw) = segment.filter(|s| !s.trim().trim_matches('/').is_empty()) else {
            info!("Public view requested without a slug");
            return ViewState::NotFound;
        };

        let Some(slug) = PublicSlug::from_segment(raw) else {
            info!(segment = raw, "Public view requested with a malformed slug");
            return ViewState::NotFound;
        };

        match self.lookup.by_public_url(&slug).await {
            Lookup::Found { profile, source } => {
                debug!(public_url = %slug, %source, "Public profile resolved");
                ViewState::Found(Box::new(profile))
            }
            Lookup::Missing { store_error: None } => {
                info!(public_url = %slug, "No profile for public slug");
                ViewState::NotFound
            }
            Lookup::Missing {
                store_error: Some(e),
            } => {
                warn!(public_url = %slug, error = %e, "Public profile could not be resolved");
                ViewState::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// A started navigation; hand it back to [`PublicProfileView::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    generation: u64,
    segment: Option<String>,
}

impl Navigation {
    /// The segment being navigated to.
    #[must_use]
    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }
}

/// The public page, guarded against out-of-order resolutions.
///
/// Every navigation bumps a generation counter and resets the state to
/// `Loading`. A result is applied only if it belongs to the latest
/// navigation.
#[derive(Debug)]
pub struct PublicProfileView {
    resolver: PublicResolver,
    generation: u64,
    state: ViewState,
}

impl PublicProfileView {
    /// Create a view that has not navigated anywhere yet.
    #[must_use]
    pub fn new(resolver: PublicResolver) -> Self {
        Self {
            resolver,
            generation: 0,
            state: ViewState::Loading,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start navigating to `segment`.
    pub fn navigate(&mut self, segment: Option<&str>) -> Navigation {
        self.generation += 1;
        self.state = ViewState::Loading;
        Navigation {
            generation: self.generation,
            segment: segment.map(str::to_string),
        }
    }

    /// Apply the result of `navigation`. Returns `false` and discards the
    /// result if a newer navigation has started since.
    pub fn complete(&mut self, navigation: &Navigation, state: ViewState) -> bool {
        if navigation.generation != self.generation {
            debug!(
                stale = navigation.generation,
                current = self.generation,
                "Discarding stale public view result"
            );
            return false;
        }
        self.state = state;
        true
    }

    /// Resolve `navigation` without touching the view.
    pub async fn resolve(&self, navigation: &Navigation) -> ViewState {
        self.resolver.resolve(navigation.segment()).await
    }

    /// Navigate to `segment` and wait for the result.
    pub async fn open(&mut self, segment: Option<&str>) -> &ViewState {
        let navigation = self.navigate(segment);
        let state = self.resolve(&navigation).await;
        self.complete(&navigation, state);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::LocalCache;
    use crate::profile::{ProfileDetails, DEFAULT_SLUG_LENGTH};
    use crate::store::{OfflineStore, ProfileStore, SqliteProfileStore};

    fn profile(user_id: &str) -> EmergencyProfile {
        let mut details = ProfileDetails::blank();
        details.full_name = format!("Owner of {user_id}");
        EmergencyProfile::assemble(details, user_id, None, DEFAULT_SLUG_LENGTH)
    }

    fn online() -> (PublicResolver, Arc<SqliteProfileStore>, Arc<LocalCache>) {
        let store = Arc::new(SqliteProfileStore::open_in_memory().unwrap());
        let cache = Arc::new(LocalCache::open_in_memory().unwrap());
        let resolver = PublicResolver::new(TieredLookup::new(store.clone(), cache.clone()));
        (resolver, store, cache)
    }

    fn offline() -> (PublicResolver, Arc<LocalCache>) {
        let cache = Arc::new(LocalCache::open_in_memory().unwrap());
        let lookup = TieredLookup::new(Arc::new(OfflineStore::new("unreachable")), cache.clone());
        (PublicResolver::new(lookup), cache)
    }

    fn numbers() -> Vec<String> {
        vec!["101".to_string(), "100".to_string(), "102".to_string()]
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let (resolver, store, _cache) = online();
        let p = profile("uid-1");
        store.save_profile(&p).await.unwrap();

        let state = resolver.resolve(Some(p.public_url.suffix())).await;
        assert_eq!(state.profile().map(|f| f.id.as_str()), Some(p.id.as_str()));
    }

    #[tokio::test]
    async fn test_resolve_doesnotexist() {
        let (resolver, _store, _cache) = online();
        assert_eq!(resolver.resolve(Some("doesnotexist")).await, ViewState::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_doesnotexist_with_cache_entries() {
        let (resolver, _store, cache) = online();
        cache.store_profile(&profile("uid-a")).unwrap();
        cache.set_item("profile_broken", "nope").unwrap();
        assert_eq!(resolver.resolve(Some("doesnotexist")).await, ViewState::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_missing_and_malformed_segments() {
        let (resolver, _store, _cache) = online();
        assert_eq!(resolver.resolve(None).await, ViewState::NotFound);
        assert_eq!(resolver.resolve(Some("")).await, ViewState::NotFound);
        assert_eq!(resolver.resolve(Some("/")).await, ViewState::NotFound);
        assert_eq!(resolver.resolve(Some("a b")).await, ViewState::NotFound);
        assert_eq!(resolver.resolve(Some("../etc")).await, ViewState::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_cache_fallback_on_miss() {
        let (resolver, _store, cache) = online();
        let p = profile("uid-1");
        cache.store_profile(&p).unwrap();

        let state = resolver.resolve(Some(p.public_url.suffix())).await;
        assert!(state.profile().is_some());
    }

    #[tokio::test]
    async fn test_resolve_offline() {
        let (resolver, cache) = offline();
        let p = profile("uid-1");

        let state = resolver.resolve(Some(p.public_url.suffix())).await;
        assert!(matches!(state, ViewState::Failed { .. }));

        cache.store_profile(&p).unwrap();
        let state = resolver.resolve(Some(p.public_url.suffix())).await;
        assert!(state.profile().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_slug_first_match() {
        let (resolver, store, _cache) = online();
        let first = profile("uid-a");
        let mut second = profile("uid-b");
        second.public_url = first.public_url.clone();
        store.save_profile(&first).await.unwrap();
        store.save_profile(&second).await.unwrap();

        let state = resolver.resolve(Some(first.public_url.suffix())).await;
        assert_eq!(state.profile().map(|f| f.user_id.as_str()), Some("uid-a"));
    }

    #[test]
    fn test_not_found_and_failed_render_identically() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let failed = ViewState::Failed {
            reason: "store unavailable".to_string(),
        };
        assert_eq!(
            ViewState::NotFound.render(today, &numbers()),
            failed.render(today, &numbers())
        );
        assert!(!failed.render(today, &numbers()).contains("store unavailable"));
    }

    #[tokio::test]
    async fn test_view_open() {
        let (resolver, store, _cache) = online();
        let p = profile("uid-1");
        store.save_profile(&p).await.unwrap();

        let mut view = PublicProfileView::new(resolver);
        assert_eq!(view.state(), &ViewState::Loading);
        assert!(view.open(Some(p.public_url.suffix())).await.is_settled());
        assert!(view.state().profile().is_some());
    }

    #[tokio::test]
    async fn test_stale_navigation_is_discarded() {
        let (resolver, store, _cache) = online();
        let a = profile("uid-a");
        let b = profile("uid-b");
        store.save_profile(&a).await.unwrap();
        store.save_profile(&b).await.unwrap();

        let mut view = PublicProfileView::new(resolver);
        let first = view.navigate(Some(a.public_url.suffix()));
        let second = view.navigate(Some(b.public_url.suffix()));

        let second_state = view.resolve(&second).await;
        assert!(view.complete(&second, second_state));

        let first_state = view.resolve(&first).await;
        assert!(!view.complete(&first, first_state));
        assert_eq!(
            view.state().profile().map(|f| f.user_id.as_str()),
            Some("uid-b")
        );
    }

    #[test]
    fn test_navigate_resets_to_loading() {
        let (resolver, _store, _cache) = online();
        let mut view = PublicProfileView::new(resolver);
        let nav = view.navigate(Some("abc"));
        assert!(view.complete(&nav, ViewState::NotFound));
        view.navigate(Some("def"));
        assert_eq!(view.state(), &ViewState::Loading);
    }
}
