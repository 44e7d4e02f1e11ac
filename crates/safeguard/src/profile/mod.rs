//! Emergency profile data model.
//!
//! An [`EmergencyProfile`] is the record one user owns: the details they
//! fill in ([`ProfileDetails`]) plus identity and bookkeeping fields that are
//! assigned when the profile is first saved and preserved afterwards.

mod details;
mod slug;
mod timestamp;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub use details::{
    parse_birth_date, EmergencyContact, PrivacySettings, ProfileDetails, BLOOD_GROUPS, GENDERS,
};
pub use slug::{PublicSlug, DEFAULT_SLUG_LENGTH, SLUG_PREFIX};
pub use timestamp::Timestamp;

/// A user's emergency profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyProfile {
    /// Profile identifier. Assigned once, never changed.
    pub id: String,
    /// Owning user's identifier.
    pub user_id: String,
    /// Owner-editable fields.
    #[serde(flatten)]
    pub details: ProfileDetails,
    /// Set once when the profile is created.
    pub created_at: Timestamp,
    /// Bumped on every save.
    pub updated_at: Timestamp,
    /// Public slug. Generated once; QR codes and shared links depend on it.
    pub public_url: PublicSlug,
}

impl EmergencyProfile {
    /// Build the profile to save from submitted details.
    ///
    /// With no `prior` profile this is a create: a new id and a fresh slug
    /// are generated and `created_at` is now. With a `prior` profile this is
    /// an edit: `id`, `created_at` and `public_url` are carried over
    /// unchanged. `updated_at` is always now.
    #[must_use]
    pub fn assemble(
        details: ProfileDetails,
        user_id: &str,
        prior: Option<&EmergencyProfile>,
        slug_length: usize,
    ) -> Self {
        let now = Timestamp::now();
        match prior {
            Some(prior) => Self {
                id: prior.id.clone(),
                user_id: user_id.to_string(),
                details,
                created_at: prior.created_at.clone(),
                updated_at: now,
                public_url: prior.public_url.clone(),
            },
            None => Self {
                id: new_profile_id(),
                user_id: user_id.to_string(),
                details,
                created_at: now.clone(),
                updated_at: now,
                public_url: PublicSlug::generate(slug_length),
            },
        }
    }

    /// The owner's age on `today`, if the birth date is valid and not in the
    /// future.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.details
            .birth_date()
            .and_then(|birth| calendar_age(birth, today))
    }

    /// The share URL (and QR payload) for this profile under `base_url`.
    #[must_use]
    pub fn share_url(&self, base_url: &str) -> String {
        self.public_url.share_url(base_url)
    }
}

/// Generate a new profile identifier.
#[must_use]
pub fn new_profile_id() -> String {
    format!("profile_{}", uuid::Uuid::new_v4().simple())
}

/// Whole years between `birth` and `today`.
///
/// One year is subtracted when today's month/day precedes the birth
/// month/day. Returns `None` if `birth` is after `today`.
#[must_use]
pub fn calendar_age(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
