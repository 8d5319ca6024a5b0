//! Duplicate detection against the record store.
//!
//! Every check is a full scan of the store; nothing is indexed or cached
//! between calls.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::store::RecordStore;

/// The field that collided with an existing registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateField {
    /// Email address, compared case-insensitively.
    Email,
    /// Phone number, compared exactly.
    Phone,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email address"),
            Self::Phone => write!(f, "phone number"),
        }
    }
}

/// Scans a [`RecordStore`] for existing email or phone registrations.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateChecker<'a> {
    store: &'a RecordStore,
}

impl<'a> DuplicateChecker<'a> {
    /// Create a checker over `store`.
    #[must_use]
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Find which field, if any, is already registered.
    ///
    /// Email is checked before phone. Empty or absent values never match.
    /// Rows skipped from listings as malformed still count.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    pub fn find_duplicate(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<DuplicateField>> {
        let email = email.filter(|e| !e.is_empty());
        let phone = phone.filter(|p| !p.is_empty());
        if email.is_none() && phone.is_none() {
            return Ok(None);
        }

        let keys = self.store.keys()?;

        if let Some(email) = email {
            if keys.iter().any(|k| k.matches_email(email)) {
                debug!("Email {} is already registered", email);
                return Ok(Some(DuplicateField::Email));
            }
        }
        if let Some(phone) = phone {
            if keys.iter().any(|k| k.matches_phone(phone)) {
                debug!("Phone {} is already registered", phone);
                return Ok(Some(DuplicateField::Phone));
            }
        }
        Ok(None)
    }

    /// Check whether either the email or the phone is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    pub fn is_duplicate(&self, email: Option<&str>, phone: Option<&str>) -> Result<bool> {
        Ok(self.find_duplicate(email, phone)?.is_some())
    }
}
