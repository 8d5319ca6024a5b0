//! Command-line interface for regdesk.
//!
//! This module provides the CLI structure for the `regdesk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    ConfigCommand, HealthCommand, ListCommand, OutputFormat, RegisterCommand, StatusCommand,
};

/// regdesk - Event registration desk
///
/// Accepts attendee registrations into a CSV file, rejecting malformed and
/// duplicate entries and issuing sequential registration IDs.
#[derive(Debug, Parser)]
#[command(name = "regdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the registration file if it does not exist
    Init,

    /// Register an attendee
    Register(RegisterCommand),

    /// List all registrations
    List(ListCommand),

    /// Show registration totals and limits
    Status(StatusCommand),

    /// Report liveness
    Health(HealthCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
