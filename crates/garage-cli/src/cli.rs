//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Garage - Vehicle maintenance logbook
#[derive(Parser)]
#[command(name = "garage")]
#[command(about = "Self-hosted vehicle maintenance logbook", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "garage.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set GARAGE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, size, record counts)
    Status,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Directory where entry attachments are stored
        #[arg(long, default_value = "uploads")]
        uploads_dir: PathBuf,
    },

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Manage vehicles
    Vehicles {
        /// Owner's email
        #[arg(short, long)]
        user: String,

        #[command(subcommand)]
        action: Option<VehiclesAction>,
    },

    /// Manage service schedules
    Schedules {
        /// Owner's email
        #[arg(short, long)]
        user: String,

        #[command(subcommand)]
        action: Option<SchedulesAction>,
    },

    /// List reminders with their due flag
    Reminders {
        /// Owner's email
        #[arg(short, long)]
        user: String,
    },

    /// Show cost, mileage and fuel statistics
    Stats {
        /// Owner's email
        #[arg(short, long)]
        user: String,

        /// Only count records on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Export service entries to CSV
    Export {
        /// Owner's email
        #[arg(short, long)]
        user: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import service entries from CSV
    Import {
        /// Owner's email
        #[arg(short, long)]
        user: String,

        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List all accounts
    List,

    /// Create an account
    Add {
        /// Login email
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Password (falls back to the GARAGE_PASSWORD environment variable)
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum VehiclesAction {
    /// List vehicles
    List,

    /// Add a vehicle
    Add {
        /// Manufacturer (e.g., "Toyota")
        #[arg(long)]
        make: String,

        /// Model (e.g., "Corolla")
        #[arg(long)]
        model: String,

        /// Production year
        #[arg(long)]
        year: Option<i32>,

        /// Fuel type (e.g., "Diesel", "LPG+petrol")
        #[arg(long)]
        fuel: Option<String>,

        /// Registration plate
        #[arg(long)]
        plate: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SchedulesAction {
    /// List schedules, soonest due first
    List,

    /// Add a recurring service schedule
    Add {
        /// Service kind (e.g., "Oil change")
        #[arg(long)]
        kind: String,

        /// Vehicle ID
        #[arg(long)]
        vehicle: Option<i64>,

        /// Calendar interval in months
        #[arg(long)]
        every_months: Option<i64>,

        /// Distance interval in km
        #[arg(long)]
        every_km: Option<i64>,

        /// Date of the last service (YYYY-MM-DD)
        #[arg(long)]
        last_date: Option<String>,

        /// Odometer at the last service
        #[arg(long)]
        last_mileage: Option<i64>,
    },
}
