//! `safeguard` - Emergency medical profiles with privacy-filtered public access
//!
//! An owner keeps one emergency profile: medical details, emergency contacts
//! and privacy flags. The profile is published under a random slug so that a
//! first responder holding the link (or its QR code) can read the fields the
//! owner chose to expose, without signing in.
//!
//! Profiles live in a [`store::ProfileStore`]. Every read goes through a
//! [`lookup::TieredLookup`] that falls back to a [`cache::LocalCache`] when the
//! store cannot be reached. Public lookups by slug also use the cache when
//! the store has no match.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod profile;
pub mod public;
pub mod store;

pub use auth::{AuthProvider, CurrentUser, FixedIdentity, User};
pub use cache::LocalCache;
pub use config::Config;
pub use dashboard::{Dashboard, SaveOutcome};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use lookup::TieredLookup;
pub use profile::{EmergencyProfile, PrivacySettings, ProfileDetails, PublicSlug};
pub use public::{PublicProfile, PublicProfileView, PublicResolver, ViewState};
pub use store::{ProfileStore, SqliteProfileStore};
