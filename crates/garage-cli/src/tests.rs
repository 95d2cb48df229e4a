//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::NaiveDate;
use garage_core::db::Database;
use garage_core::models::{EntryFilter, NewSchedule, NewServiceEntry, NewVehicle};

use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    let db = Database::in_memory().unwrap();
    commands::cmd_users_add(&db, "driver@example.com", "Driver", Some("secret")).unwrap();
    db
}

fn add_car(db: &Database) -> i64 {
    commands::cmd_vehicles_add(
        db,
        "driver@example.com",
        &NewVehicle {
            make: "Toyota".into(),
            model: "Corolla".into(),
            year: Some(2018),
            reg_plate: Some("KR 55512".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let user = commands::resolve_user(db, "driver@example.com").unwrap();
    db.list_vehicles(user.id).unwrap()[0].id
}

// ========== Users ==========

#[test]
fn test_cmd_users_add_and_list() {
    let db = setup_test_db();
    assert!(commands::cmd_users_list(&db).is_ok());

    let users = db.list_users().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "driver@example.com");

    // Passwords are hashed, so the stored credentials still verify
    assert!(db.authenticate("driver@example.com", "secret").is_ok());
}

#[test]
fn test_cmd_users_add_duplicate() {
    let db = setup_test_db();
    let result = commands::cmd_users_add(&db, "DRIVER@example.com", "Again", Some("pw"));
    assert!(result.is_err());
}

#[test]
fn test_resolve_user_unknown() {
    let db = setup_test_db();
    let err = commands::resolve_user(&db, "nobody@example.com").unwrap_err();
    assert!(err.to_string().contains("User not found"));
}

// ========== Vehicles & schedules ==========

#[test]
fn test_cmd_vehicles_add_and_list() {
    let db = setup_test_db();
    add_car(&db);
    assert!(commands::cmd_vehicles_list(&db, "driver@example.com").is_ok());

    let result = commands::cmd_vehicles_add(
        &db,
        "driver@example.com",
        &NewVehicle {
            make: "Fiat".into(),
            ..Default::default()
        },
    );
    assert!(result.is_err());
}

#[test]
fn test_cmd_schedules_add_derives_next_due() {
    let db = setup_test_db();
    let car = add_car(&db);

    commands::cmd_schedules_add(
        &db,
        "driver@example.com",
        &NewSchedule {
            vehicle_id: Some(car),
            kind: "Timing belt".into(),
            interval_months: Some(60),
            interval_km: Some(120_000),
            last_service_date: NaiveDate::from_ymd_opt(2020, 2, 29),
            last_service_mileage: Some(60_000),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(commands::cmd_schedules_list(&db, "driver@example.com").is_ok());

    let user = commands::resolve_user(&db, "driver@example.com").unwrap();
    let schedules = db.list_schedules(user.id).unwrap();
    assert_eq!(schedules[0].next_due_date, NaiveDate::from_ymd_opt(2025, 2, 28));
    assert_eq!(schedules[0].next_due_mileage, Some(180_000));
}

#[test]
fn test_cmd_schedules_add_requires_kind() {
    let db = setup_test_db();
    let result = commands::cmd_schedules_add(&db, "driver@example.com", &NewSchedule::default());
    assert!(result.is_err());
}

// ========== Reminders & stats ==========

#[test]
fn test_cmd_reminders_list_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_reminders_list(&db, "driver@example.com").is_ok());
}

#[test]
fn test_cmd_stats() {
    let db = setup_test_db();
    let car = add_car(&db);
    let user = commands::resolve_user(&db, "driver@example.com").unwrap();
    db.create_entry(
        user.id,
        &NewServiceEntry {
            vehicle_id: Some(car),
            date: NaiveDate::from_ymd_opt(2024, 1, 5),
            mileage: Some(90_000),
            service_type: "Oil".into(),
            cost: Some(250.0),
            ..Default::default()
        },
    )
    .unwrap();

    assert!(commands::cmd_stats(&db, "driver@example.com", None, false).is_ok());
    assert!(commands::cmd_stats(&db, "driver@example.com", Some("2024-01-01"), true).is_ok());

    let result = commands::cmd_stats(&db, "driver@example.com", Some("01/01/2024"), false);
    assert!(result.unwrap_err().to_string().contains("--since"));
}

// ========== CSV ==========

#[test]
fn test_cmd_export_then_import() {
    let db = setup_test_db();
    let car = add_car(&db);
    let user = commands::resolve_user(&db, "driver@example.com").unwrap();
    db.create_entry(
        user.id,
        &NewServiceEntry {
            vehicle_id: Some(car),
            date: NaiveDate::from_ymd_opt(2024, 4, 1),
            service_type: "Brakes".into(),
            cost: Some(780.5),
            ..Default::default()
        },
    )
    .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("entries.csv");
    commands::cmd_export(&db, "driver@example.com", Some(path.clone())).unwrap();

    let csv = std::fs::read_to_string(&path).unwrap();
    assert!(csv.starts_with("date,vehicle_id,vehicle,mileage,service_type,description,cost"));
    assert!(csv.contains("Brakes"));

    commands::cmd_import(&db, "driver@example.com", &path).unwrap();
    let entries = db.list_entries(user.id, &EntryFilter::default()).unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_cmd_import_missing_file() {
    let db = setup_test_db();
    let result = commands::cmd_import(
        &db,
        "driver@example.com",
        std::path::Path::new("/nonexistent/entries.csv"),
    );
    assert!(result.unwrap_err().to_string().contains("Failed to open file"));
}

// ========== Helpers ==========

#[test]
fn test_parse_date_arg() {
    assert_eq!(
        commands::parse_date_arg(Some("2024-02-29"), "--since").unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29)
    );
    assert_eq!(commands::parse_date_arg(None, "--since").unwrap(), None);
    assert!(commands::parse_date_arg(Some("2023-02-29"), "--since").is_err());
}

#[test]
fn test_server_config_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    // Environment overrides are only read when set; the defaults apply otherwise
    if std::env::var("GARAGE_SESSION_TTL_HOURS").is_err()
        && std::env::var("GARAGE_ALLOWED_ORIGINS").is_err()
    {
        let config = commands::server_config_from_env(dir.path()).unwrap();
        assert_eq!(config.uploads_dir, dir.path());
        assert_eq!(
            config.session_ttl_hours,
            garage_server::DEFAULT_SESSION_TTL_HOURS
        );
        assert!(config.allowed_origins.is_empty());
    }
}

#[test]
fn test_parse_session_ttl() {
    assert_eq!(
        commands::parse_session_ttl(None).unwrap(),
        garage_server::DEFAULT_SESSION_TTL_HOURS
    );
    assert_eq!(
        commands::parse_session_ttl(Some("  ")).unwrap(),
        garage_server::DEFAULT_SESSION_TTL_HOURS
    );
    assert_eq!(commands::parse_session_ttl(Some(" 48 ")).unwrap(), 48);
    assert!(commands::parse_session_ttl(Some("0")).is_err());
    assert!(commands::parse_session_ttl(Some("abc")).is_err());
    assert!(commands::parse_session_ttl(Some("9223372036854775807")).is_err());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("Oil change", 24), "Oil change");
    assert_eq!(truncate("Timing belt and water pump", 12), "Timing be...");
    assert_eq!(truncate("Wymiana oleju ąę", 10), "Wymiana...");
}
