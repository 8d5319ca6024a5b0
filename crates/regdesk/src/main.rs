//! `regdesk` - CLI for the registration desk
//!
//! This binary exposes registration, the admin listing, and health checks
//! on the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use regdesk::cli::{Cli, Command, ConfigCommand, OutputFormat, RegisterCommand};
use regdesk::{init_logging, Config, Registration, RegistrationForm, RegistrationService};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    let mut service = RegistrationService::from_config(&config);

    match cli.command {
        Command::Init => handle_init(&service),
        Command::Register(cmd) => handle_register(&mut service, &cmd),
        Command::List(cmd) => handle_list(&service, cmd.format),
        Command::Status(cmd) => handle_status(&service, &config, cmd.json),
        Command::Health(cmd) => handle_health(&service, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_init(service: &RegistrationService) -> anyhow::Result<ExitCode> {
    let store = service.store();
    store
        .ensure_initialized()
        .with_context(|| format!("initializing {}", store.path().display()))?;
    println!("Registration file ready: {}", store.path().display());
    Ok(ExitCode::SUCCESS)
}

fn handle_register(
    service: &mut RegistrationService,
    cmd: &RegisterCommand,
) -> anyhow::Result<ExitCode> {
    let form = RegistrationForm::from(cmd);

    match service.register(&form) {
        Ok(id) => {
            if cmd.json {
                let body = serde_json::json!({ "success": true, "registration_id": id });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Registration successful! Your Registration ID is: {id}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if !e.is_user_error() {
                tracing::error!("Registration failed: {}", e);
            }
            if cmd.json {
                let body = serde_json::json!({ "success": false, "message": e.user_message() });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                eprintln!("{}", e.user_message());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn handle_list(service: &RegistrationService, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let registrations = service.list_all().context("reading registrations")?;

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "total_registrations": registrations.len(),
                "registrations": registrations,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Plain => {
            for r in &registrations {
                println!(
                    "{} {} <{}> {} {} / {} {}",
                    r.registration_id,
                    r.full_name,
                    r.email,
                    r.phone,
                    r.department,
                    r.year,
                    r.created_at.format("%Y-%m-%d %H:%M:%S"),
                );
            }
        }
        OutputFormat::Table => print_table(&registrations),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_table(registrations: &[Registration]) {
    const HEADINGS: [&str; 8] = [
        "ID",
        "Name",
        "Email",
        "Phone",
        "Department",
        "Year",
        "College",
        "Registered",
    ];

    let rows: Vec<[String; 8]> = registrations
        .iter()
        .map(|r| {
            [
                r.registration_id.to_string(),
                r.full_name.clone(),
                r.email.clone(),
                r.phone.clone(),
                r.department.clone(),
                r.year.clone(),
                r.college.clone(),
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();

    let mut widths = HEADINGS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let print_row = |cells: &[&str]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", line.join("  ").trim_end());
    };

    print_row(&HEADINGS);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        print_row(&cells);
    }
    println!();
    println!("{} registration(s)", registrations.len());
}

fn handle_status(
    service: &RegistrationService,
    config: &Config,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let stats = service.stats().context("reading registrations")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} registration status", config.event.name);
    println!("--------------------------------");
    println!("Open:          {}", if stats.open { "yes" } else { "no" });
    println!("Registered:    {}", stats.store.total_registrations);
    if stats.store.malformed_records > 0 {
        println!(
            "Unlisted:      {} (malformed rows, still counted)",
            stats.store.malformed_records
        );
    }
    match (stats.capacity, stats.remaining) {
        (Some(capacity), Some(remaining)) => {
            println!("Capacity:      {capacity}");
            println!("Remaining:     {remaining}");
        }
        _ => println!("Capacity:      unlimited"),
    }
    if let Some(newest) = stats.store.newest_registration {
        println!("Latest:        {}", newest.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("File:          {}", service.store().path().display());
    println!("File size:     {} bytes", stats.store.file_size_bytes);
    Ok(ExitCode::SUCCESS)
}

fn handle_health(service: &RegistrationService, json: bool) -> anyhow::Result<ExitCode> {
    let health = service.health();
    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!(
            "{}: {} ({})",
            health.status,
            health.message,
            health.timestamp.format("%Y-%m-%dT%H:%M:%S")
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Event]");
                println!("  Name:               {}", config.event.name);
                println!("  Organization:       {}", config.event.organization);
                println!("  Dates:              {}", config.event.dates);
                println!("  Venue:              {}", config.event.venue);
                println!("  Admin email:        {}", config.event.admin_email);
                println!();
                println!("[Registration]");
                println!("  Open:               {}", config.registration.open);
                println!(
                    "  Max registrations:  {}",
                    config
                        .capacity()
                        .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
                );
                println!("  ID prefix:          {}", config.registration.id_prefix);
                println!("  Departments:");
                for department in &config.registration.departments {
                    println!("    - {department}");
                }
                println!(
                    "  Years of study:     {}",
                    config.registration.years_of_study.join(", ")
                );
                println!();
                println!("[Storage]");
                println!("  Data path:          {}", config.data_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
