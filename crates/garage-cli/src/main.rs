//! Garage CLI - Vehicle maintenance logbook
//!
//! Usage:
//!   garage init                          Initialize database
//!   garage users add --email E --name N  Create an account
//!   garage vehicles --user E list        List a user's vehicles
//!   garage serve --port 3000             Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use garage_core::models::{NewSchedule, NewVehicle};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            static_dir,
            uploads_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                cli.no_encrypt,
                static_dir.as_deref(),
                &uploads_dir,
            )
            .await
        }
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(UsersAction::List) => commands::cmd_users_list(&db),
                Some(UsersAction::Add {
                    email,
                    name,
                    password,
                }) => commands::cmd_users_add(&db, &email, &name, password.as_deref()),
            }
        }
        Commands::Vehicles { user, action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(VehiclesAction::List) => commands::cmd_vehicles_list(&db, &user),
                Some(VehiclesAction::Add {
                    make,
                    model,
                    year,
                    fuel,
                    plate,
                }) => commands::cmd_vehicles_add(
                    &db,
                    &user,
                    &NewVehicle {
                        make,
                        model,
                        year,
                        fuel,
                        reg_plate: plate,
                    },
                ),
            }
        }
        Commands::Schedules { user, action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(SchedulesAction::List) => commands::cmd_schedules_list(&db, &user),
                Some(SchedulesAction::Add {
                    kind,
                    vehicle,
                    every_months,
                    every_km,
                    last_date,
                    last_mileage,
                }) => {
                    let last_service_date =
                        commands::parse_date_arg(last_date.as_deref(), "--last-date")?;
                    commands::cmd_schedules_add(
                        &db,
                        &user,
                        &NewSchedule {
                            vehicle_id: vehicle,
                            kind,
                            interval_months: every_months,
                            interval_km: every_km,
                            last_service_date,
                            last_service_mileage: last_mileage,
                            ..Default::default()
                        },
                    )
                }
            }
        }
        Commands::Reminders { user } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_reminders_list(&db, &user)
        }
        Commands::Stats { user, since, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_stats(&db, &user, since.as_deref(), json)
        }
        Commands::Export { user, output } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(&db, &user, output)
        }
        Commands::Import { user, file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &user, &file)
        }
    }
}
