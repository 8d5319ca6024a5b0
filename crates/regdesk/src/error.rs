//! Error types for regdesk.
//!
//! This module defines all error types used throughout the regdesk crate,
//! separating attendee-facing rejections from storage and configuration
//! failures so callers can decide what to show.

use std::path::PathBuf;
use thiserror::Error;

use crate::dedup::DuplicateField;
use crate::validation::Rejection;

/// Message shown to attendees when a registration fails for reasons
/// they cannot fix themselves.
pub const GENERIC_FAILURE_MESSAGE: &str = "Registration failed. Please try again.";

/// The main error type for regdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Registration Errors ===
    /// One or more form fields failed validation.
    #[error("{0}")]
    Validation(Rejection),

    /// The email address or phone number is already registered.
    #[error("this {field} is already registered")]
    Duplicate {
        /// The field that collided with an existing record.
        field: DuplicateField,
    },

    /// Registration has been closed by the organizers.
    #[error("registration is closed")]
    RegistrationClosed,

    /// The configured registration limit has been reached.
    #[error("registration limit of {limit} reached")]
    CapacityReached {
        /// The configured maximum number of registrations.
        limit: usize,
    },

    /// No further sequence number fits after the highest stored identifier.
    #[error("registration ids with prefix {prefix} are exhausted")]
    IdsExhausted {
        /// The identifier prefix in use.
        prefix: String,
    },

    // === Storage Errors ===
    /// The record file exists but could not be read.
    #[error("failed to read registrations from {path}: {source}")]
    StorageRead {
        /// Path to the record file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// A record could not be written to the record file.
    #[error("failed to write registration to {path}: {source}")]
    StorageWrite {
        /// Path to the record file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// The record file header does not match the registration schema.
    #[error("record file {path} has an unexpected header: {found}")]
    SchemaMismatch {
        /// Path to the record file.
        path: PathBuf,
        /// The header row that was found.
        found: String,
    },

    /// A single row of the record file could not be parsed.
    #[error("malformed record at line {line}: {message}")]
    MalformedRecord {
        /// One-based line number in the record file.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for regdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        Self::Validation(rejection)
    }
}

impl Error {
    /// Create a storage read error for the given path.
    #[must_use]
    pub fn storage_read(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        Self::StorageRead {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a storage write error for the given path.
    #[must_use]
    pub fn storage_write(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        Self::StorageWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a malformed record error.
    #[must_use]
    pub fn malformed_record(line: u64, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            message: message.into(),
        }
    }

    /// Check if this error is something the attendee can correct.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Duplicate { .. }
                | Self::RegistrationClosed
                | Self::CapacityReached { .. }
        )
    }

    /// Check if this error came from the record file.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::StorageRead { .. }
                | Self::StorageWrite { .. }
                | Self::SchemaMismatch { .. }
                | Self::MalformedRecord { .. }
                | Self::DirectoryCreate { .. }
        )
    }

    /// The message to show the attendee.
    ///
    /// Rejections carry specific guidance; everything else collapses to a
    /// generic retry message so storage details never leak to the form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(rejection) => rejection.to_string(),
            Self::Duplicate { field } => {
                format!("This {field} is already registered.")
            }
            Self::RegistrationClosed => "Registration is currently closed.".to_string(),
            Self::CapacityReached { .. } => {
                "Registration is full. No more seats are available.".to_string()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
