//! Garage Core Library
//!
//! Shared functionality for the Garage vehicle maintenance logbook:
//! - Database access and migrations
//! - Periodic service schedules with calendar-correct due dates
//! - Reminder due flags
//! - Cost and fuel consumption statistics
//! - CSV export/import of service entries

pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod patch;
pub mod reminders;
pub mod schedule;
pub mod stats;

pub use db::Database;
pub use error::{Error, Result};
pub use export::{ImportStats, ENTRY_CSV_HEADERS};
pub use patch::Patch;
pub use schedule::{add_months_clamped, derive_next_due, DueOverrides, NextDue, ScheduleFacts};
pub use stats::{compute_statistics, Statistics};
