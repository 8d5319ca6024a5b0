//! CSV schema definitions for the record file.
//!
//! This module contains the canonical header row and the mapping between
//! a [`Registration`] and one CSV row.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::registration::{Registration, RegistrationId};

/// Column headers of the record file, in order.
pub const HEADERS: [&str; 9] = [
    "RegistrationID",
    "FullName",
    "Email",
    "Phone",
    "Department",
    "Year",
    "College",
    "RegDate",
    "RegTime",
];

/// Format of the `RegDate` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of the `RegTime` column.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// One row of the record file, exactly as it appears on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecordRow {
    #[serde(rename = "RegistrationID")]
    pub registration_id: String,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "College")]
    pub college: String,
    #[serde(rename = "RegDate")]
    pub reg_date: String,
    #[serde(rename = "RegTime")]
    pub reg_time: String,
}

impl From<&Registration> for RecordRow {
    fn from(record: &Registration) -> Self {
        Self {
            registration_id: record.registration_id.to_string(),
            full_name: record.full_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            department: record.department.clone(),
            year: record.year.clone(),
            college: record.college.clone(),
            reg_date: record.created_at.format(DATE_FORMAT).to_string(),
            reg_time: record.created_at.format(TIME_FORMAT).to_string(),
        }
    }
}

impl RecordRow {
    /// Convert the raw row into a registration.
    ///
    /// Returns a description of the first problem found.
    pub(crate) fn into_registration(self) -> Result<Registration, String> {
        if self.registration_id.is_empty() {
            return Err("missing RegistrationID".to_string());
        }
        let date = NaiveDate::parse_from_str(&self.reg_date, DATE_FORMAT)
            .map_err(|e| format!("invalid RegDate '{}': {e}", self.reg_date))?;
        let time = NaiveTime::parse_from_str(&self.reg_time, TIME_FORMAT)
            .map_err(|e| format!("invalid RegTime '{}': {e}", self.reg_time))?;

        Ok(Registration {
            registration_id: RegistrationId::from_raw(self.registration_id),
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            department: self.department,
            year: self.year,
            college: self.college,
            created_at: NaiveDateTime::new(date, time),
        })
    }
}

/// Column positions of the uniqueness keys.
const REGISTRATION_ID_COLUMN: usize = 0;
const EMAIL_COLUMN: usize = 2;
const PHONE_COLUMN: usize = 3;

/// The identifier, email and phone of one stored row.
///
/// Read by column position, so a row with an unparseable date or a
/// missing trailing column still yields its keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    /// Stored registration identifier, possibly empty.
    pub registration_id: RegistrationId,
    /// Stored email address, possibly empty.
    pub email: String,
    /// Stored phone number, possibly empty.
    pub phone: String,
}

impl RecordKeys {
    /// Extract the keys from a raw row, or `None` if every key cell is blank.
    pub(crate) fn from_record(record: &csv::StringRecord) -> Option<Self> {
        let cell = |index: usize| record.get(index).map_or("", str::trim).to_string();

        let keys = Self {
            registration_id: RegistrationId::from_raw(cell(REGISTRATION_ID_COLUMN)),
            email: cell(EMAIL_COLUMN),
            phone: cell(PHONE_COLUMN),
        };
        let blank = keys.registration_id.as_str().is_empty()
            && keys.email.is_empty()
            && keys.phone.is_empty();
        (!blank).then_some(keys)
    }

    /// Check if this row holds the given email, ignoring case.
    #[must_use]
    pub fn matches_email(&self, email: &str) -> bool {
        !self.email.is_empty() && self.email.to_lowercase() == email.to_lowercase()
    }

    /// Check if this row holds the given phone number.
    #[must_use]
    pub fn matches_phone(&self, phone: &str) -> bool {
        !self.phone.is_empty() && self.phone == phone
    }
}

/// Check whether a header row matches [`HEADERS`].
///
/// Surrounding whitespace in header cells is tolerated.
pub(crate) fn header_matches(header: &csv::StringRecord) -> bool {
    header.len() == HEADERS.len()
        && header
            .iter()
            .zip(HEADERS)
            .all(|(found, expected)| found.trim() == expected)
}
