//! Plain-text rendering of the public view.

use std::fmt::Write;

use super::projection::PublicProfile;
use crate::profile::Timestamp;

/// Heading of the not-found page.
pub const NOT_FOUND_TITLE: &str = "Profile Not Found";

const RULE: &str = "------------------------------------------------------------";

/// The fixed message shown whenever no profile can be displayed.
#[must_use]
pub fn safety_message(emergency_numbers: &[String]) -> String {
    format!(
        "If this is an emergency, please contact emergency services directly at {}",
        emergency_numbers.join(",")
    )
}

/// Render the not-found page.
///
/// Every reason a profile could not be shown renders this same page.
#[must_use]
pub fn render_not_found(emergency_numbers: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{NOT_FOUND_TITLE}");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "The emergency profile you're looking for doesn't exist or has been removed."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "!! {}", safety_message(emergency_numbers));
    out
}

/// Render the loading placeholder.
#[must_use]
pub fn render_loading() -> String {
    "Loading Emergency Profile\nPlease wait while we retrieve the emergency information...\n"
        .to_string()
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{RULE}");
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<22}{value}");
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Format a wire timestamp for people; unparseable values are shown as-is.
fn human_time(wire: &str) -> String {
    match Timestamp::parse(wire).as_datetime() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => wire.to_string(),
    }
}

/// Render a projected profile.
#[must_use]
pub fn render_profile(profile: &PublicProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "*** EMERGENCY MEDICAL INFORMATION ***");

    section(&mut out, "Personal Information");
    field(&mut out, "Full Name", &profile.full_name);
    match profile.age {
        Some(age) => field(&mut out, "Age", &format!("{age} years old")),
        None => field(&mut out, "Age", "Unknown"),
    }
    field(&mut out, "Gender", &profile.gender);
    field(&mut out, "Blood Group", &profile.blood_group);
    if let Some(location) = &profile.general_location {
        field(&mut out, "Location", location);
    }
    field(&mut out, "Organ Donor", yes_no(profile.is_organ_donor));

    if profile.has_medical_alerts() || profile.disabilities.is_some() {
        section(&mut out, "Medical Information [CRITICAL]");
        if let Some(allergies) = &profile.allergies {
            field(&mut out, "ALLERGIES", allergies);
        }
        if let Some(medications) = &profile.medications {
            field(&mut out, "CURRENT MEDICATIONS", medications);
        }
        if let Some(conditions) = &profile.medical_conditions {
            field(&mut out, "MEDICAL CONDITIONS", conditions);
        }
        if let Some(disabilities) = &profile.disabilities {
            field(&mut out, "DISABILITIES", disabilities);
        }
    }

    section(&mut out, "Emergency Contacts");
    for (index, contact) in profile.emergency_contacts.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, contact.name);
        field(&mut out, "   Relationship", &contact.relationship);
        field(&mut out, "   Primary Phone", &contact.primary_phone);
        if let Some(alternate) = &contact.alternate_phone {
            field(&mut out, "   Alternate Phone", alternate);
        }
    }

    if profile.has_care_provider() {
        section(&mut out, "Healthcare Provider");
        if let Some(hospital) = &profile.preferred_hospital {
            field(&mut out, "Preferred Hospital", hospital);
        }
        if let Some(doctor) = &profile.doctor {
            field(&mut out, "Primary Physician", &doctor.name);
            if let Some(contact) = &doctor.contact {
                field(&mut out, "Physician Phone", contact);
            }
        }
        if let Some(insurance) = &profile.health_insurance {
            field(&mut out, "Health Insurance", insurance);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "SafeGuard - Emergency Identity System");
    let _ = writeln!(out, "Last Updated: {}", human_time(&profile.last_updated));
    out
}
