//! Sequential registration identifiers.
//!
//! The next identifier is always derived from what is on disk, so a
//! restart never reuses a number.

use tracing::debug;

use crate::error::{Error, Result};
use crate::registration::RegistrationId;
use crate::store::RecordStore;

/// Default identifier prefix.
pub const DEFAULT_PREFIX: &str = "ANT25";

/// Produces the next registration identifier for a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    prefix: String,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl IdGenerator {
    /// Create a generator issuing identifiers with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Get the identifier prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Compute the identifier following every identifier in `existing`.
    ///
    /// Identifiers without this generator's prefix, or whose suffix is not
    /// purely numeric, are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdsExhausted`] if the highest sequence number is
    /// already `u32::MAX`.
    pub fn next_after<'a, I>(&self, existing: I) -> Result<RegistrationId>
    where
        I: IntoIterator<Item = &'a RegistrationId>,
    {
        let max = existing
            .into_iter()
            .filter_map(|id| id.sequence(&self.prefix))
            .max();
        let next = match max {
            None => 1,
            Some(n) => n.checked_add(1).ok_or_else(|| Error::IdsExhausted {
                prefix: self.prefix.clone(),
            })?,
        };
        Ok(RegistrationId::new(&self.prefix, next))
    }

    /// Compute the next identifier from the store's current contents.
    ///
    /// Rows with malformed dates or columns still reserve their identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read, or if the
    /// sequence is exhausted. There is no fallback identifier.
    pub fn next_id(&self, store: &RecordStore) -> Result<RegistrationId> {
        let keys = store.keys()?;
        let id = self.next_after(keys.iter().map(|k| &k.registration_id))?;
        debug!("Next registration id is {}", id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::Registration;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn ids(raw: &[&str]) -> Vec<RegistrationId> {
        raw.iter().map(|s| RegistrationId::from_raw(*s)).collect()
    }

    #[test]
    fn test_first_id() {
        let generator = IdGenerator::default();
        assert_eq!(generator.next_after(std::iter::empty()).unwrap().as_str(), "ANT250001");
    }

    #[test]
    fn test_next_after_max() {
        let generator = IdGenerator::default();
        let existing = ids(&["ANT250003", "ANT250001", "ANT250002"]);
        assert_eq!(generator.next_after(&existing).unwrap().as_str(), "ANT250004");
    }

    #[test]
    fn test_next_uses_max_not_count() {
        let generator = IdGenerator::default();
        let existing = ids(&["ANT250001", "ANT250010"]);
        assert_eq!(generator.next_after(&existing).unwrap().as_str(), "ANT250011");
    }

    #[test]
    fn test_ignores_foreign_and_garbage_ids() {
        let generator = IdGenerator::default();
        let existing = ids(&["ANT250005", "XYZ999999", "ANT25abcd", "ANT25", "legacy-7"]);
        assert_eq!(generator.next_after(&existing).unwrap().as_str(), "ANT250006");
    }

    #[test]
    fn test_only_garbage_starts_over() {
        let generator = IdGenerator::default();
        let existing = ids(&["ANT25x", "OTHER0001"]);
        assert_eq!(generator.next_after(&existing).unwrap().as_str(), "ANT250001");
    }

    #[test]
    fn test_grows_past_four_digits() {
        let generator = IdGenerator::default();
        let existing = ids(&["ANT259999"]);
        assert_eq!(generator.next_after(&existing).unwrap().as_str(), "ANT2510000");
    }

    #[test]
    fn test_exhausted_sequence_is_error() {
        let generator = IdGenerator::default();
        let existing = vec![RegistrationId::new("ANT25", u32::MAX)];
        let err = generator.next_after(&existing).unwrap_err();
        assert!(matches!(err, Error::IdsExhausted { ref prefix } if prefix == "ANT25"));
    }

    #[test]
    fn test_custom_prefix() {
        let generator = IdGenerator::new("EVT");
        assert_eq!(generator.prefix(), "EVT");
        let existing = ids(&["EVT0041", "ANT250100"]);
        assert_eq!(generator.next_after(&existing).unwrap().as_str(), "EVT0042");
    }

    #[test]
    fn test_next_id_from_store() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("registrations.csv"));
        let generator = IdGenerator::default();

        assert_eq!(generator.next_id(&store).unwrap().as_str(), "ANT250001");

        store
            .append(&Registration {
                registration_id: RegistrationId::from_raw("ANT250007"),
                full_name: "Seeded".to_string(),
                email: "seed@example.com".to_string(),
                phone: "1234567890".to_string(),
                department: "Other".to_string(),
                year: "First Year".to_string(),
                college: String::new(),
                created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            })
            .unwrap();

        assert_eq!(generator.next_id(&store).unwrap().as_str(), "ANT250008");
    }

    #[test]
    fn test_next_id_propagates_read_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registrations.csv");
        std::fs::write(&path, "not,the,right,header\n").unwrap();

        let generator = IdGenerator::default();
        let result = generator.next_id(&RecordStore::new(&path));
        assert!(result.is_err());
    }

    #[test]
    fn test_next_id_counts_rows_with_bad_dates() {
        use std::io::Write;

        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("registrations.csv"));
        store.ensure_initialized().unwrap();

        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(store.path())
            .unwrap();
        writeln!(
            file,
            "ANT250005,Asha Patil,asha@example.com,9876543210,MCA,Third Year,,07/03/2025,10:00:00"
        )
        .unwrap();

        assert!(store.read_all().unwrap().is_empty());
        let generator = IdGenerator::default();
        assert_eq!(generator.next_id(&store).unwrap().as_str(), "ANT250006");
    }
}
