//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, resolve_user)
//! - `import` - CSV export and import of service entries
//! - `reminders` - Reminder listing
//! - `schedules` - Service schedule commands
//! - `serve` - Web server command
//! - `stats` - Statistics summary
//! - `status` - Database status
//! - `users` - User account commands
//! - `vehicles` - Vehicle commands

pub mod core;
pub mod import;
pub mod reminders;
pub mod schedules;
pub mod serve;
pub mod stats;
pub mod status;
pub mod users;
pub mod vehicles;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use reminders::*;
pub use schedules::*;
pub use serve::*;
pub use stats::*;
pub use status::*;
pub use users::*;
pub use vehicles::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
