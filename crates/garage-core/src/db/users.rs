//! User accounts and login sessions

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewUser, User};

/// Size of the random session token carried in the cookie
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Longest session lifetime accepted (10 years)
pub const MAX_SESSION_TTL_HOURS: i64 = 10 * 366 * 24;

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Digest stored in place of the raw session token
fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let created_at: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Register a user. Emails are unique case-insensitively.
    pub fn create_user(&self, input: &NewUser) -> Result<User> {
        let email = input.email.trim().to_lowercase();
        let name = input.name.trim();
        if email.is_empty() || name.is_empty() || input.password.is_empty() {
            return Err(Error::Validation("missing_fields"));
        }

        let conn = self.conn()?;
        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(Error::Conflict("email_in_use"));
        }

        let password_hash = hash_password(&input.password)?;
        conn.execute(
            "INSERT INTO users (email, name, password_hash) VALUES (?, ?, ?)",
            params![email, name, password_hash],
        )?;
        let id = conn.last_insert_rowid();
        debug!(user_id = id, "Registered user");

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE id = ?",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE email = ?",
                params![email.trim().to_lowercase()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, email, name, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Check an email/password pair
    ///
    /// Unknown email and wrong password fail the same way.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let conn = self.conn()?;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((id, stored)) if verify_password(password, &stored) => self
                .get_user(id)?
                .ok_or(Error::Unauthorized("invalid_credentials")),
            _ => {
                warn!("Rejected login attempt");
                Err(Error::Unauthorized("invalid_credentials"))
            }
        }
    }

    /// Start a session and return the raw token for the cookie
    pub fn create_session(&self, user_id: i64, ttl_hours: i64) -> Result<String> {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let ttl_hours = ttl_hours.clamp(-MAX_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS);
        let expires_at = Utc::now() + Duration::hours(ttl_hours);
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, ?)",
            params![token_digest(&token), user_id, format_datetime(&expires_at)],
        )?;
        Ok(token)
    }

    /// Resolve a cookie token to its user, ignoring expired sessions
    pub fn session_user(&self, token: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                r#"
                SELECT u.id, u.email, u.name, u.created_at
                FROM sessions s
                JOIN users u ON u.id = s.user_id
                WHERE s.token_hash = ? AND s.expires_at > ?
                "#,
                params![token_digest(token), format_datetime(&Utc::now())],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?",
            params![token_digest(token)],
        )?;
        Ok(())
    }

    /// Remove expired sessions, returning how many were dropped
    pub fn purge_expired_sessions(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?",
            params![format_datetime(&Utc::now())],
        )?;
        if removed > 0 {
            debug!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}
