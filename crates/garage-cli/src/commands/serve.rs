//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use garage_core::db::MAX_SESSION_TTL_HOURS;

use super::open_db;

/// Build the server configuration from CLI flags and environment variables
///
/// - `GARAGE_ALLOWED_ORIGINS`: comma-separated CORS origins
/// - `GARAGE_SECURE_COOKIES`: `1`/`true` marks the session cookie `Secure`
/// - `GARAGE_SESSION_TTL_HOURS`: session lifetime in hours
pub fn server_config_from_env(uploads_dir: &Path) -> Result<garage_server::ServerConfig> {
    let allowed_origins =
        garage_server::parse_origins(&std::env::var("GARAGE_ALLOWED_ORIGINS").unwrap_or_default());

    let secure_cookies = std::env::var("GARAGE_SECURE_COOKIES")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let session_ttl_hours =
        parse_session_ttl(std::env::var("GARAGE_SESSION_TTL_HOURS").ok().as_deref())?;

    Ok(garage_server::ServerConfig {
        allowed_origins,
        uploads_dir: uploads_dir.to_path_buf(),
        session_ttl_hours,
        secure_cookies,
    })
}

/// Parse a session lifetime in hours, bounded to `MAX_SESSION_TTL_HOURS`
pub fn parse_session_ttl(raw: Option<&str>) -> Result<i64> {
    match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v
            .parse::<i64>()
            .ok()
            .filter(|h| (1..=MAX_SESSION_TTL_HOURS).contains(h))
            .with_context(|| {
                format!(
                    "Invalid GARAGE_SESSION_TTL_HOURS: {} (expected 1-{})",
                    v, MAX_SESSION_TTL_HOURS
                )
            }),
        _ => Ok(garage_server::DEFAULT_SESSION_TTL_HOURS),
    }
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    uploads_dir: &Path,
) -> Result<()> {
    let config = server_config_from_env(uploads_dir)?;

    println!("🚀 Starting Garage web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    println!("   Uploads: {}", uploads_dir.display());
    println!("   🍪 Sessions: {} hour(s)", config.session_ttl_hours);
    if !config.allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} (GARAGE_ALLOWED_ORIGINS)",
            config.allowed_origins.join(", ")
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    garage_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
