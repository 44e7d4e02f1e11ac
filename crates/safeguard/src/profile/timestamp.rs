//! Profile timestamps.
//!
//! A profile held in memory may carry timestamps that were parsed into
//! date-times, or timestamps that are still in their textual wire form
//! (for example a profile read back verbatim from the local cache). Both are
//! valid; serialization only formats the ones that are still date-times.

use std::fmt;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A creation or modification timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// A parsed date-time.
    Date(DateTime<Utc>),
    /// An already-serialized value, kept verbatim.
    Text(String),
}

impl Timestamp {
    /// The current time, at the millisecond precision of the wire form.
    #[must_use]
    pub fn now() -> Self {
        Self::Date(Utc::now().trunc_subsecs(3))
    }

    /// Parse a wire value, falling back to keeping it as text.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        DateTime::parse_from_rfc3339(value)
            .map_or_else(|_| Self::Text(value.to_string()), |dt| {
                Self::Date(dt.with_timezone(&Utc))
            })
    }

    /// The textual wire form: ISO-8601 UTC with millisecond precision.
    ///
    /// Text values are returned unchanged.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Date(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            Self::Text(text) => text.clone(),
        }
    }

    /// The timestamp as a date-time, if it is one or can be parsed as one.
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(dt) => Some(*dt),
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Date(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}
