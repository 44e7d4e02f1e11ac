//! Persisted record shape and partial updates.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::profile::{
    EmergencyContact, EmergencyProfile, PrivacySettings, ProfileDetails, PublicSlug, Timestamp,
};

/// A profile as written to the document store.
///
/// Identical to [`EmergencyProfile`] except that timestamps are always in
/// their textual wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Profile identifier.
    pub id: String,
    /// Owning user's identifier.
    pub user_id: String,
    /// Owner-editable fields.
    #[serde(flatten)]
    pub details: ProfileDetails,
    /// ISO-8601 creation time.
    pub created_at: String,
    /// ISO-8601 modification time.
    pub updated_at: String,
    /// Public slug.
    pub public_url: String,
}

impl ProfileRecord {
    /// Parse a stored JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid record.
    pub fn from_document(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Serialize to a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_document(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&EmergencyProfile> for ProfileRecord {
    fn from(profile: &EmergencyProfile) -> Self {
        Self {
            id: profile.id.clone(),
            user_id: profile.user_id.clone(),
            details: profile.details.clone(),
            created_at: profile.created_at.to_wire(),
            updated_at: profile.updated_at.to_wire(),
            public_url: profile.public_url.as_str().to_string(),
        }
    }
}

impl From<ProfileRecord> for EmergencyProfile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            details: record.details,
            created_at: Timestamp::parse(&record.created_at),
            updated_at: Timestamp::parse(&record.updated_at),
            public_url: PublicSlug::from_stored(record.public_url),
        }
    }
}

/// A partial update of a stored profile.
///
/// Only owner-editable fields can be changed this way; the identifier,
/// owner, slug and creation time are fixed. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub medical_conditions: Option<String>,
    pub disabilities: Option<String>,
    pub is_organ_donor: Option<bool>,
    pub preferred_hospital: Option<String>,
    pub doctor_name: Option<String>,
    pub doctor_contact: Option<String>,
    pub health_insurance: Option<String>,
    pub general_location: Option<String>,
    pub emergency_contacts: Option<Vec<EmergencyContact>>,
    pub privacy: Option<PrivacySettings>,
}

impl ProfileUpdate {
    /// An update that replaces only the privacy settings.
    #[must_use]
    pub fn privacy(privacy: PrivacySettings) -> Self {
        Self {
            privacy: Some(privacy),
            ..Self::default()
        }
    }

    /// Whether this update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the set fields into `details`.
    pub fn apply_to(self, details: &mut ProfileDetails) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut details.full_name, self.full_name);
        if self.profile_picture_url.is_some() {
            details.profile_picture_url = self.profile_picture_url;
        }
        set(&mut details.date_of_birth, self.date_of_birth);
        set(&mut details.gender, self.gender);
        set(&mut details.blood_group, self.blood_group);
        set(&mut details.allergies, self.allergies);
        set(&mut details.medications, self.medications);
        set(&mut details.medical_conditions, self.medical_conditions);
        set(&mut details.disabilities, self.disabilities);
        set(&mut details.is_organ_donor, self.is_organ_donor);
        set(&mut details.preferred_hospital, self.preferred_hospital);
        set(&mut details.doctor_name, self.doctor_name);
        set(&mut details.doctor_contact, self.doctor_contact);
        if self.health_insurance.is_some() {
            details.health_insurance = self.health_insurance;
        }
        set(&mut details.general_location, self.general_location);
        set(&mut details.emergency_contacts, self.emergency_contacts);
        set(&mut details.privacy, self.privacy);
    }
}
