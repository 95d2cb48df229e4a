//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `resolve_user` - Look up the account a command acts on
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use garage_core::db::Database;
use garage_core::models::User;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Find a user by email or fail with a hint
pub fn resolve_user(db: &Database, email: &str) -> Result<User> {
    db.get_user_by_email(email)?.ok_or_else(|| {
        anyhow::anyhow!(
            "User not found: {}. Create one with: garage users add --email {} --name <name>",
            email,
            email
        )
    })
}

/// Parse an optional YYYY-MM-DD command-line date
pub fn parse_date_arg(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    db.ping().context("Database is not reachable")?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create an account: garage users add --email you@example.com --name You");
    println!("  2. Start web UI: garage serve");

    Ok(())
}
