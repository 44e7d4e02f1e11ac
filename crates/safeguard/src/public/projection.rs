//! Privacy projection of a profile for anonymous viewers.

use chrono::NaiveDate;
use serde::Serialize;

use crate::profile::{EmergencyContact, EmergencyProfile};

/// A doctor's details as shown publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorInfo {
    /// Doctor's name.
    pub name: String,
    /// Doctor's phone, if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// An emergency contact as shown publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicContact {
    /// Contact's name.
    pub name: String,
    /// Relationship to the owner.
    pub relationship: String,
    /// Primary phone.
    pub primary_phone: String,
    /// Alternate phone, if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<String>,
}

impl From<&EmergencyContact> for PublicContact {
    fn from(contact: &EmergencyContact) -> Self {
        Self {
            name: contact.name.clone(),
            relationship: contact.relationship.clone(),
            primary_phone: contact.primary_phone.clone(),
            alternate_phone: contact.alternate_phone().map(str::to_string),
        }
    }
}

/// The fields of a profile an anonymous viewer may see.
///
/// Empty free-text fields are `None`. Fields behind a privacy flag are
/// `None` unless the flag is set and the value is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    /// Full name.
    pub full_name: String,
    /// Age derived from the birth date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Gender.
    pub gender: String,
    /// Blood group.
    pub blood_group: String,
    /// Registered organ donor.
    pub is_organ_donor: bool,
    /// Coarse location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_location: Option<String>,
    /// Allergies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    /// Current medications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,
    /// Medical conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    /// Disabilities, when the owner shows them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabilities: Option<String>,
    /// Emergency contacts.
    pub emergency_contacts: Vec<PublicContact>,
    /// Preferred hospital.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_hospital: Option<String>,
    /// Doctor details, when the owner shows them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorInfo>,
    /// Health insurance, when the owner shows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_insurance: Option<String>,
    /// When the profile was last saved, in wire form.
    pub last_updated: String,
}

fn provided(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

impl PublicProfile {
    /// Project `profile` for an anonymous viewer, computing age as of `today`.
    ///
    /// `show_exact_location` is not consulted: the profile only holds a
    /// coarse location, which is always shown.
    #[must_use]
    pub fn project(profile: &EmergencyProfile, today: NaiveDate) -> Self {
        let details = &profile.details;
        let privacy = details.privacy;

        let doctor = if privacy.show_doctor_info {
            provided(&details.doctor_name).map(|name| DoctorInfo {
                name,
                contact: provided(&details.doctor_contact),
            })
        } else {
            None
        };

        Self {
            full_name: details.full_name.clone(),
            age: profile.age_on(today),
            gender: details.gender.clone(),
            blood_group: details.blood_group.clone(),
            is_organ_donor: details.is_organ_donor,
            general_location: provided(&details.general_location),
            allergies: provided(&details.allergies),
            medications: provided(&details.medications),
            medical_conditions: provided(&details.medical_conditions),
            disabilities: privacy
                .show_disabilities
                .then(|| provided(&details.disabilities))
                .flatten(),
            emergency_contacts: details
                .emergency_contacts
                .iter()
                .map(PublicContact::from)
                .collect(),
            preferred_hospital: provided(&details.preferred_hospital),
            doctor,
            health_insurance: privacy
                .show_insurance
                .then(|| details.health_insurance().and_then(provided))
                .flatten(),
            last_updated: profile.updated_at.to_wire(),
        }
    }

    /// Whether any critical medical text is present.
    #[must_use]
    pub fn has_medical_alerts(&self) -> bool {
        self.allergies.is_some() || self.medications.is_some() || self.medical_conditions.is_some()
    }

    /// Whether the healthcare provider section has anything to show.
    #[must_use]
    pub fn has_care_provider(&self) -> bool {
        self.preferred_hospital.is_some() || self.doctor.is_some() || self.health_insurance.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{PrivacySettings, ProfileDetails, DEFAULT_SLUG_LENGTH};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn full_profile(privacy: PrivacySettings) -> EmergencyProfile {
        let mut details = ProfileDetails::blank();
        details.full_name = "Asha Rao".to_string();
        details.date_of_birth = "2000-06-15".to_string();
        details.gender = "Female".to_string();
        details.blood_group = "O+".to_string();
        details.allergies = "Penicillin".to_string();
        details.medications = "Levothyroxine".to_string();
        details.medical_conditions = "Hypothyroidism".to_string();
        details.disabilities = "Hearing impaired (left ear)".to_string();
        details.is_organ_donor = true;
        details.preferred_hospital = "City General".to_string();
        details.doctor_name = "Dr. Mehta".to_string();
        details.doctor_contact = "+91 80 0000 0000".to_string();
        details.health_insurance = Some("Star Health #123".to_string());
        details.general_location = "Bengaluru".to_string();
        details.privacy = privacy;
        let contact = &mut details.emergency_contacts[0];
        contact.name = "Ravi Rao".to_string();
        contact.relationship = "Brother".to_string();
        contact.primary_phone = "+91 98450 00000".to_string();
        contact.alternate_phone = Some(String::new());
        EmergencyProfile::assemble(details, "uid-1", None, DEFAULT_SLUG_LENGTH)
    }

    fn all_hidden() -> PrivacySettings {
        PrivacySettings {
            show_doctor_info: false,
            show_insurance: false,
            show_exact_location: false,
            show_disabilities: false,
        }
    }

    fn all_shown() -> PrivacySettings {
        PrivacySettings {
            show_doctor_info: true,
            show_insurance: true,
            show_exact_location: true,
            show_disabilities: true,
        }
    }

    #[test]
    fn test_always_shown_fields() {
        let public = PublicProfile::project(&full_profile(all_hidden()), today());
        assert_eq!(public.full_name, "Asha Rao");
        assert_eq!(public.age, Some(23));
        assert_eq!(public.blood_group, "O+");
        assert_eq!(public.gender, "Female");
        assert!(public.is_organ_donor);
        assert_eq!(public.general_location.as_deref(), Some("Bengaluru"));
        assert_eq!(public.allergies.as_deref(), Some("Penicillin"));
        assert_eq!(public.medications.as_deref(), Some("Levothyroxine"));
        assert_eq!(public.medical_conditions.as_deref(), Some("Hypothyroidism"));
        assert_eq!(public.preferred_hospital.as_deref(), Some("City General"));
        assert_eq!(public.emergency_contacts.len(), 1);
        assert_eq!(public.emergency_contacts[0].alternate_phone, None);
    }

    #[test]
    fn test_false_flags_hide_gated_fields() {
        let public = PublicProfile::project(&full_profile(all_hidden()), today());
        assert!(public.disabilities.is_none());
        assert!(public.doctor.is_none());
        assert!(public.health_insurance.is_none());

        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("Hearing impaired"));
        assert!(!json.contains("Dr. Mehta"));
        assert!(!json.contains("Star Health"));
    }

    #[test]
    fn test_true_flags_show_gated_fields() {
        let public = PublicProfile::project(&full_profile(all_shown()), today());
        assert_eq!(
            public.disabilities.as_deref(),
            Some("Hearing impaired (left ear)")
        );
        let doctor = public.doctor.unwrap();
        assert_eq!(doctor.name, "Dr. Mehta");
        assert_eq!(doctor.contact.as_deref(), Some("+91 80 0000 0000"));
        assert_eq!(public.health_insurance.as_deref(), Some("Star Health #123"));
    }

    #[test]
    fn test_default_policy() {
        let public = PublicProfile::project(&full_profile(PrivacySettings::default()), today());
        assert!(public.disabilities.is_some());
        assert!(public.doctor.is_some());
        assert!(public.health_insurance.is_none());
    }

    #[test]
    fn test_true_flag_with_empty_value_is_absent() {
        let mut profile = full_profile(all_shown());
        profile.details.disabilities = String::new();
        profile.details.doctor_name = String::new();
        profile.details.health_insurance = Some("  ".to_string());

        let public = PublicProfile::project(&profile, today());
        assert!(public.disabilities.is_none());
        assert!(public.doctor.is_none());
        assert!(public.health_insurance.is_none());
    }

    #[test]
    fn test_exact_location_flag_is_inert() {
        let mut shown = all_hidden();
        shown.show_exact_location = true;
        let a = PublicProfile::project(&full_profile(all_hidden()), today());
        let b = PublicProfile::project(&full_profile(shown), today());
        assert_eq!(a.general_location, b.general_location);
    }

    #[test]
    fn test_empty_medical_text_is_absent() {
        let mut profile = full_profile(all_hidden());
        profile.details.allergies = String::new();
        profile.details.medications = String::new();
        profile.details.medical_conditions = String::new();

        let public = PublicProfile::project(&profile, today());
        assert!(!public.has_medical_alerts());
    }

    #[test]
    fn test_care_provider_section() {
        let mut profile = full_profile(all_hidden());
        assert!(PublicProfile::project(&profile, today()).has_care_provider());

        profile.details.preferred_hospital = String::new();
        assert!(!PublicProfile::project(&profile, today()).has_care_provider());
    }

    #[test]
    fn test_picture_and_birth_date_not_projected() {
        let mut profile = full_profile(all_shown());
        profile.details.profile_picture_url = Some("https://img.example/p.png".to_string());
        let json = serde_json::to_string(&PublicProfile::project(&profile, today())).unwrap();
        assert!(!json.contains("img.example"));
        assert!(!json.contains("2000-06-15"));
    }
}
