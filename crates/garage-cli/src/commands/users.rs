//! User account commands

use anyhow::{Context, Result};
use garage_core::db::Database;
use garage_core::models::NewUser;

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Create one with:");
        println!("  garage users add --email you@example.com --name You");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────────────────────");
    for user in users {
        println!(
            "   {:>4}  {:<30} {}",
            user.id, user.email, user.name
        );
    }

    Ok(())
}

pub fn cmd_users_add(
    db: &Database,
    email: &str,
    name: &str,
    password: Option<&str>,
) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => std::env::var("GARAGE_PASSWORD")
            .context("Pass --password or set GARAGE_PASSWORD")?,
    };

    let user = db
        .create_user(&NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password,
        })
        .with_context(|| format!("Failed to create user {}", email))?;

    println!("✅ Created user {} (id {})", user.email, user.id);
    Ok(())
}
