//! `regdesk` - Event registration with flat-file storage
//!
//! This library validates attendee registrations, rejects duplicate email
//! addresses and phone numbers, issues sequential registration IDs, and
//! appends accepted registrations to a CSV file.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod id;
pub mod logging;
pub mod registration;
pub mod service;
pub mod store;
pub mod validation;

pub use config::Config;
pub use dedup::{DuplicateChecker, DuplicateField};
pub use error::{Error, Result};
pub use id::IdGenerator;
pub use logging::init_logging;
pub use registration::{Registration, RegistrationForm, RegistrationId};
pub use service::{Health, RegistrationService, RegistrationStats};
pub use store::{RecordKeys, RecordStore, StoreStats};
pub use validation::{Rejection, Validator, Violation};
