//! Error types for Garage

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Rejected input. Carries a machine-readable reason code such as `kind_required`.
    #[error("Validation failed: {0}")]
    Validation(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Referenced vehicle is missing or belongs to someone else
    #[error("Vehicle not found")]
    VehicleNotFound,

    /// Uniqueness violation. Carries a reason code such as `email_in_use`.
    #[error("Conflict: {0}")]
    Conflict(&'static str),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),
}

impl Error {
    /// Machine-readable reason code for client-facing errors
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(code) | Self::Conflict(code) | Self::Unauthorized(code) => code,
            Self::NotFound(_) => "not_found",
            Self::VehicleNotFound => "vehicle_not_found",
            _ => "server_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
