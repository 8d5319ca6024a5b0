//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::registration::RegistrationForm;

/// Register command arguments.
///
/// Values are passed through as submitted; trimming and validation happen
/// in the registration service.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Attendee's full name
    #[arg(short, long)]
    pub name: String,

    /// Email address
    #[arg(short, long)]
    pub email: String,

    /// Ten-digit phone number
    #[arg(short, long)]
    pub phone: String,

    /// Department or branch
    #[arg(short, long)]
    pub department: String,

    /// Year of study (e.g. "Third Year")
    #[arg(short, long)]
    pub year: String,

    /// College name
    #[arg(long)]
    pub college: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl From<&RegisterCommand> for RegistrationForm {
    fn from(cmd: &RegisterCommand) -> Self {
        Self {
            full_name: cmd.name.clone(),
            email: cmd.email.clone(),
            phone: cmd.phone.clone(),
            department: cmd.department.clone(),
            year: cmd.year.clone(),
            college: cmd.college.clone().unwrap_or_default(),
        }
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::default())]
    pub format: OutputFormat,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Health command arguments.
#[derive(Debug, Args)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per registration
    Plain,
    /// Aligned columns
    #[default]
    Table,
    /// JSON document
    Json,
}
