//! The owner-editable part of an emergency profile.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Blood groups accepted when validating a draft.
pub const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Genders accepted when validating a draft.
pub const GENDERS: &[&str] = &["Male", "Female", "Other", "Prefer not to say"];

/// A person to call in an emergency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    /// Identifier, unique within the owning profile only.
    pub id: String,
    /// Contact's name.
    pub name: String,
    /// Relationship to the profile owner (e.g. "Spouse").
    pub relationship: String,
    /// Primary phone number.
    pub primary_phone: String,
    /// Alternate phone number, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<String>,
}

impl EmergencyContact {
    /// Create a blank contact with the given id.
    #[must_use]
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// The alternate phone, treating an empty string as absent.
    #[must_use]
    pub fn alternate_phone(&self) -> Option<&str> {
        self.alternate_phone.as_deref().filter(|p| !p.is_empty())
    }
}

/// Which optional fields the owner exposes on the public page.
///
/// Missing fields take the default policy: doctor info and disabilities
/// visible, insurance and exact location hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    /// Show doctor name and contact.
    pub show_doctor_info: bool,
    /// Show health insurance.
    pub show_insurance: bool,
    /// Show exact location. Stored but not consulted: only a coarse location
    /// is ever captured.
    pub show_exact_location: bool,
    /// Show the disabilities text.
    pub show_disabilities: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            show_doctor_info: true,
            show_insurance: false,
            show_exact_location: false,
            show_disabilities: true,
        }
    }
}

/// Everything the owner fills in: the profile minus its identity and
/// bookkeeping fields.
///
/// Free-text fields use an empty string for "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDetails {
    /// Full name.
    pub full_name: String,
    /// Profile picture URL. Never shown on the public page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    /// Birth date as an ISO date string (`YYYY-MM-DD`).
    pub date_of_birth: String,
    /// Gender.
    pub gender: String,
    /// Blood group.
    pub blood_group: String,
    /// Known allergies.
    pub allergies: String,
    /// Current medications.
    pub medications: String,
    /// Medical conditions.
    pub medical_conditions: String,
    /// Disabilities or special needs.
    pub disabilities: String,
    /// Registered organ donor.
    pub is_organ_donor: bool,
    /// Preferred hospital.
    pub preferred_hospital: String,
    /// Primary physician's name.
    pub doctor_name: String,
    /// Primary physician's phone.
    pub doctor_contact: String,
    /// Health insurance details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_insurance: Option<String>,
    /// Coarse location (city or area).
    pub general_location: String,
    /// Emergency contacts, in display order.
    pub emergency_contacts: Vec<EmergencyContact>,
    /// Public visibility flags.
    pub privacy: PrivacySettings,
}

impl ProfileDetails {
    /// A fresh draft: one blank contact with id `"1"` and the default
    /// privacy policy.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            emergency_contacts: vec![EmergencyContact::blank("1")],
            ..Self::default()
        }
    }

    /// Append a blank contact with the next unused numeric id and return it.
    pub fn add_contact(&mut self) -> &mut EmergencyContact {
        let next = self
            .emergency_contacts
            .iter()
            .filter_map(|c| c.id.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        self.emergency_contacts
            .push(EmergencyContact::blank(next.to_string()));
        let last = self.emergency_contacts.len() - 1;
        &mut self.emergency_contacts[last]
    }

    /// Remove the contact with the given id. Returns whether one was removed.
    pub fn remove_contact(&mut self, id: &str) -> bool {
        let before = self.emergency_contacts.len();
        self.emergency_contacts.retain(|c| c.id != id);
        self.emergency_contacts.len() != before
    }

    /// Parse the birth date, if it is a valid ISO date.
    #[must_use]
    pub fn birth_date(&self) -> Option<NaiveDate> {
        parse_birth_date(&self.date_of_birth)
    }

    /// The health insurance text, treating an empty string as absent.
    #[must_use]
    pub fn health_insurance(&self) -> Option<&str> {
        self.health_insurance.as_deref().filter(|s| !s.is_empty())
    }

    /// Check the fields the profile form requires.
    ///
    /// Storage accepts any profile; this is applied before a draft is saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfile`] naming the first failing field.
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(Error::invalid_profile("full name is required"));
        }
        if self.birth_date().is_none() {
            return Err(Error::invalid_profile(format!(
                "date of birth must be an ISO date (YYYY-MM-DD), got '{}'",
                self.date_of_birth
            )));
        }
        if !GENDERS.contains(&self.gender.as_str()) {
            return Err(Error::invalid_profile(format!(
                "gender must be one of {GENDERS:?}"
            )));
        }
        if !BLOOD_GROUPS.contains(&self.blood_group.as_str()) {
            return Err(Error::invalid_profile(format!(
                "blood group must be one of {BLOOD_GROUPS:?}"
            )));
        }
        if self.emergency_contacts.is_empty() {
            return Err(Error::invalid_profile(
                "at least one emergency contact is required",
            ));
        }
        for (index, contact) in self.emergency_contacts.iter().enumerate() {
            let missing = [
                ("name", &contact.name),
                ("relationship", &contact.relationship),
                ("primary phone", &contact.primary_phone),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());
            if let Some((field, _)) = missing {
                return Err(Error::invalid_profile(format!(
                    "emergency contact {} is missing a {field}",
                    index + 1
                )));
            }
        }
        Ok(())
    }
}

/// Parse an ISO birth date. Full RFC 3339 timestamps are accepted too and
/// reduced to their date.
#[must_use]
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_details() -> ProfileDetails {
        let mut details = ProfileDetails::blank();
        details.full_name = "Asha Rao".to_string();
        details.date_of_birth = "1990-04-02".to_string();
        details.gender = "Female".to_string();
        details.blood_group = "O+".to_string();
        let contact = &mut details.emergency_contacts[0];
        contact.name = "Ravi Rao".to_string();
        contact.relationship = "Brother".to_string();
        contact.primary_phone = "+91 98450 00000".to_string();
        details
    }

    #[test]
    fn test_privacy_default_policy() {
        let privacy = PrivacySettings::default();
        assert!(privacy.show_doctor_info);
        assert!(!privacy.show_insurance);
        assert!(!privacy.show_exact_location);
        assert!(privacy.show_disabilities);
    }

    #[test]
    fn test_partial_privacy_block_fills_defaults() {
        let privacy: PrivacySettings =
            serde_json::from_str(r#"{"showInsurance": true}"#).unwrap();
        assert!(privacy.show_insurance);
        assert!(privacy.show_doctor_info);
        assert!(privacy.show_disabilities);
        assert!(!privacy.show_exact_location);
    }

    #[test]
    fn test_missing_privacy_block_uses_defaults() {
        let details: ProfileDetails = serde_json::from_str(r#"{"fullName": "A"}"#).unwrap();
        assert_eq!(details.privacy, PrivacySettings::default());
        assert!(details.emergency_contacts.is_empty());
        assert_eq!(details.allergies, "");
    }

    #[test]
    fn test_blank_has_one_contact() {
        let details = ProfileDetails::blank();
        assert_eq!(details.emergency_contacts.len(), 1);
        assert_eq!(details.emergency_contacts[0].id, "1");
    }

    #[test]
    fn test_add_contact_uses_next_id() {
        let mut details = ProfileDetails::blank();
        assert_eq!(details.add_contact().id, "2");
        assert_eq!(details.add_contact().id, "3");
        details.remove_contact("2");
        assert_eq!(details.add_contact().id, "4");
    }

    #[test]
    fn test_add_contact_ignores_non_numeric_ids() {
        let mut details = ProfileDetails::default();
        details
            .emergency_contacts
            .push(EmergencyContact::blank("1717171717171"));
        details.emergency_contacts.push(EmergencyContact::blank("x"));
        assert_eq!(details.add_contact().id, "1717171717172");
    }

    #[test]
    fn test_remove_contact() {
        let mut details = ProfileDetails::blank();
        assert!(details.remove_contact("1"));
        assert!(!details.remove_contact("1"));
        assert!(details.emergency_contacts.is_empty());
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_details().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_name() {
        let mut details = valid_details();
        details.full_name = "  ".to_string();
        let err = details.validate().unwrap_err();
        assert!(err.to_string().contains("full name"));
    }

    #[test]
    fn test_validate_requires_birth_date() {
        let mut details = valid_details();
        details.date_of_birth = "02/04/1990".to_string();
        assert!(details.validate().unwrap_err().to_string().contains("date of birth"));
    }

    #[test]
    fn test_validate_blood_group_and_gender() {
        let mut details = valid_details();
        details.blood_group = "C+".to_string();
        assert!(details.validate().unwrap_err().to_string().contains("blood group"));

        let mut details = valid_details();
        details.gender = String::new();
        assert!(details.validate().unwrap_err().to_string().contains("gender"));
    }

    #[test]
    fn test_validate_requires_a_contact() {
        let mut details = valid_details();
        details.emergency_contacts.clear();
        assert!(details
            .validate()
            .unwrap_err()
            .to_string()
            .contains("at least one emergency contact"));
    }

    #[test]
    fn test_validate_contact_fields() {
        let mut details = valid_details();
        details.add_contact().name = "Second".to_string();
        let err = details.validate().unwrap_err().to_string();
        assert!(err.contains("contact 2"));
        assert!(err.contains("relationship"));
    }

    #[test]
    fn test_parse_birth_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2000, 6, 15);
        assert_eq!(parse_birth_date("2000-06-15"), expected);
        assert_eq!(parse_birth_date("2000-06-15T00:00:00Z"), expected);
        assert_eq!(parse_birth_date(""), None);
    }

    #[test]
    fn test_empty_optional_strings_are_absent() {
        let mut details = ProfileDetails::default();
        details.health_insurance = Some(String::new());
        assert!(details.health_insurance().is_none());

        let mut contact = EmergencyContact::blank("1");
        contact.alternate_phone = Some(String::new());
        assert!(contact.alternate_phone().is_none());
    }
}
