//! Configuration management for regdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::DEFAULT_PREFIX;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "regdesk";

/// Default record file name.
const RECORD_FILE_NAME: &str = "registrations.csv";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `REGDESK_`, sections split on `__`)
/// 2. TOML config file at `~/.config/regdesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event details.
    pub event: EventConfig,
    /// Registration rules.
    pub registration: RegistrationConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Details about the event being registered for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Event name.
    pub name: String,
    /// Organizing body.
    pub organization: String,
    /// Human-readable event dates.
    pub dates: String,
    /// Venue.
    pub venue: String,
    /// Contact address for the organizers.
    pub admin_email: String,
}

/// Registration rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Whether new registrations are accepted.
    pub open: bool,
    /// Maximum number of registrations.
    /// Set to 0 for unlimited.
    pub max_registrations: usize,
    /// Prefix of issued registration identifiers.
    pub id_prefix: String,
    /// Departments offered on the form, listed by `config show`.
    /// Display only: submitted departments are free text.
    pub departments: Vec<String>,
    /// Accepted years of study.
    /// Empty accepts any value other than the placeholder.
    pub years_of_study: Vec<String>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the record file.
    /// Defaults to `~/.local/share/regdesk/registrations.csv`
    pub data_path: Option<PathBuf>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            name: "Anantya 2025".to_string(),
            organization: "ACM PCCoE Student Chapter".to_string(),
            dates: "March 7-8, 2025".to_string(),
            venue: "PCCOE Campus, Nigdi, Pune".to_string(),
            admin_email: "pccoeacm@gmail.com".to_string(),
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            open: true,
            max_registrations: 500,
            id_prefix: DEFAULT_PREFIX.to_string(),
            departments: default_departments(),
            years_of_study: default_years_of_study(),
        }
    }
}

/// Default departments listed on the form.
fn default_departments() -> Vec<String> {
    [
        "Computer Engineering",
        "Information Technology",
        "Electronics & Telecommunication",
        "Mechanical Engineering",
        "Civil Engineering",
        "Electrical Engineering",
        "MCA",
        "MBA",
        "Other",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Default accepted years of study.
fn default_years_of_study() -> Vec<String> {
    [
        "First Year",
        "Second Year",
        "Third Year",
        "Final Year",
        "Post Graduate",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `REGDESK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(&config_file))
    }

    /// Build the layered figment for a config file path.
    fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("REGDESK_").split("__"))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.registration.id_prefix;
        if prefix.is_empty() {
            return Err(Error::ConfigValidation {
                message: "id_prefix must not be empty".to_string(),
            });
        }
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::ConfigValidation {
                message: format!("id_prefix must be ASCII letters and digits: {prefix}"),
            });
        }

        if self.registration.departments.is_empty() {
            return Err(Error::ConfigValidation {
                message: "departments must list at least one department".to_string(),
            });
        }

        if self
            .registration
            .years_of_study
            .iter()
            .any(|y| y.trim().is_empty())
        {
            return Err(Error::ConfigValidation {
                message: "years_of_study must not contain blank entries".to_string(),
            });
        }

        Ok(())
    }

    /// Get the record file path, resolving defaults if not set.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.storage
            .data_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(RECORD_FILE_NAME))
    }

    /// Get the registration limit, or `None` when unlimited.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        match self.registration.max_registrations {
            0 => None,
            n => Some(n),
        }
    }
}
