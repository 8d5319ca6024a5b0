//! Registration data types.
//!
//! This module defines the accepted [`Registration`] record, its
//! [`RegistrationId`], and the raw [`RegistrationForm`] submitted by an
//! attendee before validation.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A human-readable registration identifier such as `ANT250042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(String);

impl RegistrationId {
    /// Build an identifier from a prefix and a sequence number.
    ///
    /// The sequence is zero-padded to at least four digits.
    #[must_use]
    pub fn new(prefix: &str, sequence: u32) -> Self {
        Self(format!("{prefix}{sequence:04}"))
    }

    /// Wrap an identifier read back from storage.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Extract the sequence number if this identifier carries `prefix`
    /// followed only by ASCII digits.
    #[must_use]
    pub fn sequence(&self, prefix: &str) -> Option<u32> {
        let digits = self.0.strip_prefix(prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One accepted attendee sign-up.
///
/// Records are immutable once appended to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Sequential identifier assigned on acceptance.
    pub registration_id: RegistrationId,
    /// Attendee's full name.
    pub full_name: String,
    /// Lowercased email address.
    pub email: String,
    /// Ten-digit phone number.
    pub phone: String,
    /// Department or branch.
    pub department: String,
    /// Year of study.
    pub year: String,
    /// College name, empty when not given.
    pub college: String,
    /// Local date and time the registration was accepted.
    pub created_at: NaiveDateTime,
}

impl Registration {
    /// Check if this record was registered with the given email,
    /// ignoring case.
    #[must_use]
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /// Check if this record was registered with the given phone number.
    #[must_use]
    pub fn matches_phone(&self, phone: &str) -> bool {
        self.phone == phone
    }
}

/// Raw form input for a registration attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    /// Full name (`fullname` form field).
    #[serde(rename = "fullname")]
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Department.
    pub department: String,
    /// Year of study.
    pub year: String,
    /// Optional college name.
    pub college: String,
}

impl RegistrationForm {
    /// Build a form from submitted key/value pairs.
    ///
    /// Recognized keys are `fullname`, `email`, `phone`, `department`,
    /// `year` and `college`. Unknown keys are ignored and missing keys
    /// become empty strings.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (key, value) in fields {
            let slot = match key.as_ref() {
                "fullname" => &mut form.full_name,
                "email" => &mut form.email,
                "phone" => &mut form.phone,
                "department" => &mut form.department,
                "year" => &mut form.year,
                "college" => &mut form.college,
                _ => continue,
            };
            *slot = value.into();
        }
        form
    }

    /// Return a copy with surrounding whitespace removed from every field
    /// and the email lowercased.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            department: self.department.trim().to_string(),
            year: self.year.trim().to_string(),
            college: self.college.trim().to_string(),
        }
    }
}

impl From<&HashMap<String, String>> for RegistrationForm {
    fn from(fields: &HashMap<String, String>) -> Self {
        Self::from_fields(fields.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }
}
