//! Registration service.
//!
//! Orchestrates one registration attempt: normalize the form, validate it,
//! check for duplicates, assign the next identifier, and append the record.
//!
//! # Example
//!
//! ```no_run
//! use regdesk::{RecordStore, RegistrationForm, RegistrationService};
//!
//! let mut service = RegistrationService::new(RecordStore::new("data/registrations.csv"));
//!
//! let form = RegistrationForm::from_fields([
//!     ("fullname", "Asha Patil"),
//!     ("email", "asha@example.com"),
//!     ("phone", "9876543210"),
//!     ("department", "Computer Engineering"),
//!     ("year", "Third Year"),
//! ]);
//!
//! match service.register(&form) {
//!     Ok(id) => println!("Registered as {id}"),
//!     Err(e) => println!("{}", e.user_message()),
//! }
//! ```

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dedup::DuplicateChecker;
use crate::error::{Error, Result};
use crate::id::IdGenerator;
use crate::registration::{Registration, RegistrationForm, RegistrationId};
use crate::store::{RecordStore, StoreStats};
use crate::validation::Validator;

/// Accepts registrations into a [`RecordStore`].
///
/// The store location is injected; the service holds no cached copy of
/// its contents. `register` takes `&mut self` so a single service instance
/// cannot interleave two check-then-append sequences.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    store: RecordStore,
    validator: Validator,
    ids: IdGenerator,
    open: bool,
    capacity: Option<usize>,
    event_name: String,
}

impl RegistrationService {
    /// Create a service over `store` that is open, unlimited, accepts any
    /// year of study, and issues `ANT25` identifiers.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            validator: Validator::default(),
            ids: IdGenerator::default(),
            open: true,
            capacity: None,
            event_name: String::from("Registration"),
        }
    }

    /// Create a service from application configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            store: RecordStore::new(config.data_path()),
            validator: Validator::new(config.registration.years_of_study.clone()),
            ids: IdGenerator::new(config.registration.id_prefix.clone()),
            open: config.registration.open,
            capacity: config.capacity(),
            event_name: config.event.name.clone(),
        }
    }

    /// Replace the validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Replace the identifier generator.
    #[must_use]
    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Set whether registration is open.
    #[must_use]
    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Set the registration limit, `None` for unlimited.
    #[must_use]
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    /// Get the underlying record store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Register an attendee, timestamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistrationClosed`] or [`Error::CapacityReached`]
    /// when no more registrations are accepted, [`Error::Validation`] when
    /// fields are missing or malformed, [`Error::Duplicate`] when the email
    /// or phone is already registered, and a storage error when the record
    /// file cannot be read or written.
    pub fn register(&mut self, form: &RegistrationForm) -> Result<RegistrationId> {
        let now = Local::now().naive_local().trunc_subsecs(0);
        self.register_at(form, now)
    }

    /// Register an attendee with an explicit acceptance time.
    ///
    /// # Errors
    ///
    /// See [`RegistrationService::register`].
    pub fn register_at(
        &mut self,
        form: &RegistrationForm,
        created_at: NaiveDateTime,
    ) -> Result<RegistrationId> {
        let form = form.normalized();

        if !self.open {
            debug!("Rejected registration for {}: closed", form.email);
            return Err(Error::RegistrationClosed);
        }
        if let Some(limit) = self.capacity {
            if self.store.count()? >= limit {
                warn!("Registration limit of {} reached", limit);
                return Err(Error::CapacityReached { limit });
            }
        }

        self.validator.validate(&form).map_err(|rejection| {
            debug!("Rejected registration: {}", rejection);
            Error::Validation(rejection)
        })?;

        let checker = DuplicateChecker::new(&self.store);
        let duplicate =
            checker.find_duplicate(Some(form.email.as_str()), Some(form.phone.as_str()))?;
        if let Some(field) = duplicate {
            debug!("Rejected registration: duplicate {}", field);
            return Err(Error::Duplicate { field });
        }

        let registration_id = self.ids.next_id(&self.store)?;
        let record = Registration {
            registration_id: registration_id.clone(),
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            department: form.department,
            year: form.year,
            college: form.college,
            created_at,
        };
        self.store.append(&record)?;

        info!("Accepted registration {}", registration_id);
        Ok(registration_id)
    }

    /// List every stored registration in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the record file exists but cannot be read.
    pub fn list_all(&self) -> Result<Vec<Registration>> {
        self.store.read_all()
    }

    /// Summarize registration counts against the configured limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the record file exists but cannot be read.
    pub fn stats(&self) -> Result<RegistrationStats> {
        let store = self.store.stats()?;
        let remaining = self
            .capacity
            .map(|limit| limit.saturating_sub(store.total_registrations));
        Ok(RegistrationStats {
            open: self.open,
            capacity: self.capacity,
            remaining,
            store,
        })
    }

    /// Report liveness.
    #[must_use]
    pub fn health(&self) -> Health {
        Health {
            status: "healthy",
            message: format!("{} is running", self.event_name),
            timestamp: Local::now().naive_local(),
        }
    }
}

/// Registration totals and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationStats {
    /// Whether new registrations are accepted.
    pub open: bool,
    /// Configured limit, `None` when unlimited.
    pub capacity: Option<usize>,
    /// Seats left, `None` when unlimited.
    pub remaining: Option<usize>,
    /// Record store statistics.
    #[serde(flatten)]
    pub store: StoreStats,
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    /// Always `"healthy"` when the process can answer.
    pub status: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Local time of the check.
    pub timestamp: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DuplicateField;
    use crate::validation::Violation;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_service() -> (TempDir, RegistrationService) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = RecordStore::new(dir.path().join("registrations.csv"));
        (dir, RegistrationService::new(store))
    }

    fn form(email: &str, phone: &str) -> RegistrationForm {
        RegistrationForm {
            full_name: "Asha Patil".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            department: "Computer Engineering".to_string(),
            year: "Third Year".to_string(),
            college: "PCCoE".to_string(),
        }
    }

    fn sequence(id: &RegistrationId) -> u32 {
        id.sequence("ANT25").expect("id should carry the ANT25 prefix")
    }

    #[test]
    fn test_first_registration_gets_first_id() {
        let (_dir, mut service) = create_test_service();

        let id = service.register(&form("a@example.com", "1111111111")).unwrap();
        assert_eq!(id.as_str(), "ANT250001");
    }

    #[test]
    fn test_ids_match_format_and_increase() {
        let (_dir, mut service) = create_test_service();

        let mut previous = 0;
        for i in 0..5 {
            let id = service
                .register(&form(&format!("user{i}@example.com"), &format!("900000000{i}")))
                .unwrap();
            let s = id.as_str();
            assert_eq!(s.len(), 9);
            assert!(s.starts_with("ANT25"));
            assert!(s[5..].bytes().all(|b| b.is_ascii_digit()));

            let seq = sequence(&id);
            assert!(seq > previous);
            previous = seq;
        }
    }

    #[test]
    fn test_duplicate_email_in_different_case() {
        let (_dir, mut service) = create_test_service();

        service.register(&form("A@b.com", "1111111111")).unwrap();
        let err = service.register(&form("a@B.COM", "2222222222")).unwrap_err();

        assert!(matches!(
            err,
            Error::Duplicate {
                field: DuplicateField::Email
            }
        ));
    }

    #[test]
    fn test_duplicate_phone() {
        let (_dir, mut service) = create_test_service();

        service.register(&form("a@example.com", "1234567890")).unwrap();
        let err = service
            .register(&form("b@example.com", "1234567890"))
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Duplicate {
                field: DuplicateField::Phone
            }
        ));
        assert_eq!(service.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_short_phone_is_validation_error() {
        let (_dir, mut service) = create_test_service();

        let err = service.register(&form("a@example.com", "12345")).unwrap_err();
        match err {
            Error::Validation(rejection) => {
                assert!(rejection.contains(&Violation::PhoneFormat));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_email_formats_through_service() {
        let (_dir, mut service) = create_test_service();

        let err = service
            .register(&form("not-an-email", "1111111111"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(service.register(&form("a.b+c@d.co", "1111111111")).is_ok());
    }

    #[test]
    fn test_rejected_attempt_writes_nothing() {
        let (_dir, mut service) = create_test_service();

        let _ = service.register(&form("bad", "1"));
        assert!(service.list_all().unwrap().is_empty());
        assert!(!service.store().path().exists());
    }

    #[test]
    fn test_fields_are_trimmed_and_email_lowercased() {
        let (_dir, mut service) = create_test_service();
        let raw = RegistrationForm {
            full_name: "  Asha Patil  ".to_string(),
            email: "  Asha@Example.COM ".to_string(),
            phone: " 1111111111 ".to_string(),
            department: " MBA ".to_string(),
            year: " Final Year ".to_string(),
            college: "   ".to_string(),
        };
        let created_at = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();

        service.register_at(&raw, created_at).unwrap();

        let stored = &service.list_all().unwrap()[0];
        assert_eq!(stored.full_name, "Asha Patil");
        assert_eq!(stored.email, "asha@example.com");
        assert_eq!(stored.phone, "1111111111");
        assert_eq!(stored.department, "MBA");
        assert_eq!(stored.year, "Final Year");
        assert!(stored.college.is_empty());
        assert_eq!(stored.created_at, created_at);
    }

    #[test]
    fn test_list_all_empty_store() {
        let (_dir, service) = create_test_service();
        assert!(service.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_closed_registration() {
        let (_dir, service) = create_test_service();
        let mut service = service.with_open(false);

        let err = service
            .register(&form("a@example.com", "1111111111"))
            .unwrap_err();
        assert!(matches!(err, Error::RegistrationClosed));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_capacity_reached() {
        let (_dir, service) = create_test_service();
        let mut service = service.with_capacity(Some(2));

        service.register(&form("a@example.com", "1111111111")).unwrap();
        service.register(&form("b@example.com", "2222222222")).unwrap();
        let err = service
            .register(&form("c@example.com", "3333333333"))
            .unwrap_err();

        assert!(matches!(err, Error::CapacityReached { limit: 2 }));
        assert_eq!(service.stats().unwrap().remaining, Some(0));
    }

    #[test]
    fn test_storage_read_failure_is_not_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registrations.csv");
        std::fs::write(&path, "Unrelated,Header\n").unwrap();
        let mut service = RegistrationService::new(RecordStore::new(&path));

        let err = service
            .register(&form("a@example.com", "1111111111"))
            .unwrap_err();
        assert!(err.is_storage_error());
        assert_eq!(err.user_message(), crate::error::GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_custom_prefix_and_validator() {
        let (_dir, service) = create_test_service();
        let mut service = service
            .with_id_generator(IdGenerator::new("EVT"))
            .with_validator(Validator::new(vec!["Final Year".to_string()]));

        let err = service
            .register(&form("a@example.com", "1111111111"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let mut ok = form("a@example.com", "1111111111");
        ok.year = "Final Year".to_string();
        assert_eq!(service.register(&ok).unwrap().as_str(), "EVT0001");
    }

    #[test]
    fn test_from_config() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.data_path = Some(dir.path().join("event.csv"));
        config.registration.max_registrations = 10;

        let mut service = RegistrationService::from_config(&config);
        service.register(&form("a@example.com", "1111111111")).unwrap();

        let stats = service.stats().unwrap();
        assert!(stats.open);
        assert_eq!(stats.capacity, Some(10));
        assert_eq!(stats.remaining, Some(9));
        assert_eq!(stats.store.total_registrations, 1);
        assert!(dir.path().join("event.csv").exists());
    }

    #[test]
    fn test_health() {
        let mut config = Config::default();
        config.event.name = "Hackfest".to_string();
        let service = RegistrationService::from_config(&config);

        let health = service.health();
        assert_eq!(health.status, "healthy");
        assert!(health.message.contains("Hackfest"));

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["timestamp"].is_string());
    }

    /// Append a row whose date was rewritten by a spreadsheet.
    fn append_reformatted_row(service: &RegistrationService) {
        use std::io::Write;

        service.store().ensure_initialized().unwrap();
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(service.store().path())
            .unwrap();
        writeln!(
            file,
            "ANT250005,Asha Patil,asha@example.com,9876543210,MCA,Third Year,,07/03/2025,10:00:00"
        )
        .unwrap();
    }

    #[test]
    fn test_reformatted_row_still_blocks_duplicates() {
        let (_dir, mut service) = create_test_service();
        append_reformatted_row(&service);

        let err = service
            .register(&form("asha@example.com", "9876543210"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Duplicate {
                field: DuplicateField::Email
            }
        ));

        let err = service
            .register(&form("other@example.com", "9876543210"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Duplicate {
                field: DuplicateField::Phone
            }
        ));

        let contents = std::fs::read_to_string(service.store().path()).unwrap();
        assert_eq!(contents.matches("ANT250005").count(), 1);
    }

    #[test]
    fn test_reformatted_row_reserves_its_id() {
        let (_dir, mut service) = create_test_service();
        append_reformatted_row(&service);

        let id = service
            .register(&form("new@example.com", "1111111111"))
            .unwrap();
        assert_eq!(id.as_str(), "ANT250006");
    }

    #[test]
    fn test_reformatted_row_counts_toward_capacity() {
        let (_dir, service) = create_test_service();
        let mut service = service.with_capacity(Some(1));
        append_reformatted_row(&service);

        let err = service
            .register(&form("new@example.com", "1111111111"))
            .unwrap_err();
        assert!(matches!(err, Error::CapacityReached { limit: 1 }));

        let stats = service.stats().unwrap();
        assert_eq!(stats.store.total_registrations, 1);
        assert_eq!(stats.store.malformed_records, 1);
        assert_eq!(stats.remaining, Some(0));
        assert!(service.list_all().unwrap().is_empty());
    }
}
