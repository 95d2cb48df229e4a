//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::{AppError, MAX_JSON_BODY};

pub mod auth;
pub mod entries;
pub mod export;
pub mod fuel;
pub mod health;
pub mod reminders;
pub mod schedules;
pub mod stats;
pub mod trips;
pub mod uploads;
pub mod vehicles;

// Re-export all handlers for use in router
pub use auth::*;
pub use entries::*;
pub use export::*;
pub use fuel::*;
pub use health::*;
pub use reminders::*;
pub use schedules::*;
pub use stats::*;
pub use trips::*;
pub use uploads::*;
pub use vehicles::*;

/// Read and parse a JSON request body
///
/// An empty body parses as `{}` so that all-optional payloads still reach
/// field validation.
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_JSON_BODY)
        .await
        .map_err(|_| AppError::bad_request("invalid_json"))?;
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &bytes
    };
    serde_json::from_slice(bytes).map_err(|_| AppError::bad_request("invalid_json"))
}

/// Parse an optional `YYYY-MM-DD` query or form value
pub(crate) fn parse_date_param(
    value: Option<&str>,
) -> Result<Option<chrono::NaiveDate>, AppError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::bad_request("invalid_date")),
        None => Ok(None),
    }
}

/// Parse an optional integer query or form value
pub(crate) fn parse_int_param(value: Option<&str>) -> Result<Option<i64>, AppError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::bad_request("invalid_number")),
        None => Ok(None),
    }
}

/// Parse an optional decimal form value
pub(crate) fn parse_float_param(value: Option<&str>) -> Result<Option<f64>, AppError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| AppError::bad_request("invalid_number")),
        None => Ok(None),
    }
}

/// `?vehicle_id=` filter shared by the list endpoints
#[derive(Debug, Default, serde::Deserialize)]
pub struct VehicleQuery {
    pub vehicle_id: Option<String>,
}

impl VehicleQuery {
    pub(crate) fn vehicle_id(&self) -> Result<Option<i64>, AppError> {
        parse_int_param(self.vehicle_id.as_deref())
    }
}
