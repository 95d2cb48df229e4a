//! Service entry handlers
//!
//! Entries are created from JSON or from a multipart form carrying an
//! optional attachment in the `file` field.

use std::collections::HashMap;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::header,
    Extension, Json,
};
use rand::Rng;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use garage_core::models::{EntryFilter, NewServiceEntry, ServiceEntry, ServiceEntryPatch};

use super::{parse_date_param, parse_float_param, parse_int_param, read_json};
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// Attachment extensions accepted on upload (lowercase)
pub const ALLOWED_ATTACHMENT_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "pdf", "webp"];

#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    pub vehicle_id: Option<String>,
    pub q: Option<String>,
}

/// JSON body for entry creation
#[derive(Debug, Default, Deserialize)]
pub struct CreateEntryRequest {
    pub vehicle_id: Option<i64>,
    pub date: Option<String>,
    pub mileage: Option<i64>,
    #[serde(default)]
    pub service_type: String,
    pub description: Option<String>,
    pub cost: Option<f64>,
}

/// GET /api/entries - List service entries (optional `vehicle_id` and `q` filters)
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListEntriesQuery>,
) -> Result<Json<Vec<ServiceEntry>>, AppError> {
    let filter = EntryFilter {
        vehicle_id: parse_int_param(params.vehicle_id.as_deref())?,
        query: params.q.filter(|q| !q.trim().is_empty()),
    };
    Ok(Json(state.db.list_entries(current.id(), &filter)?))
}

/// POST /api/entries - Record a service entry (JSON or multipart with `file`)
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<ServiceEntry>, AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let (input, upload) = if is_multipart {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|_| AppError::bad_request("invalid_multipart"))?;
        read_entry_form(multipart).await?
    } else {
        let body: CreateEntryRequest = read_json(request).await?;
        let input = NewServiceEntry {
            vehicle_id: body.vehicle_id,
            date: parse_date_param(body.date.as_deref())?,
            mileage: body.mileage,
            service_type: body.service_type,
            description: body.description,
            cost: body.cost,
            attachment: None,
        };
        (input, None)
    };

    let mut input = input;
    if let Some((original_name, data)) = &upload {
        let stored = stored_attachment_name(original_name)?;
        write_new_file(&state.config.uploads_dir.join(&stored), data)
            .await
            .map_err(AppError::internal)?;
        debug!(file = %stored, bytes = data.len(), "Saved attachment");
        input.attachment = Some(stored);
    }

    match state.db.create_entry(current.id(), &input) {
        Ok(entry) => {
            info!(entry_id = entry.id, vehicle_id = entry.vehicle_id, "Created service entry");
            Ok(Json(entry))
        }
        Err(e) => {
            if let Some(stored) = &input.attachment {
                remove_attachment(&state.config.uploads_dir, stored).await;
            }
            Err(e.into())
        }
    }
}

/// PUT /api/entries/:id - Partially update an entry
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<ServiceEntry>, AppError> {
    let patch: ServiceEntryPatch = read_json(request).await?;
    Ok(Json(state.db.update_entry(current.id(), id, patch)?))
}

/// DELETE /api/entries/:id - Delete an entry and its attachment
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let entry = state
        .db
        .delete_entry(current.id(), id)?
        .ok_or_else(|| AppError::not_found("not_found"))?;
    if let Some(stored) = &entry.attachment {
        remove_attachment(&state.config.uploads_dir, stored).await;
    }
    Ok(SuccessResponse::ok())
}

/// Collect the text fields and the optional `file` part of an entry form
async fn read_entry_form(
    mut multipart: Multipart,
) -> Result<(NewServiceEntry, Option<(String, Vec<u8>)>), AppError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("invalid_multipart"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|_| AppError::bad_request("invalid_multipart"))?;
            // Browsers send an empty part when no file was picked
            if !file_name.is_empty() && !data.is_empty() {
                upload = Some((file_name, data.to_vec()));
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|_| AppError::bad_request("invalid_multipart"))?;
            fields.insert(name, value);
        }
    }

    let text = |key: &str| {
        fields
            .get(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let input = NewServiceEntry {
        vehicle_id: parse_int_param(fields.get("vehicle_id").map(String::as_str))?,
        date: parse_date_param(fields.get("date").map(String::as_str))?,
        mileage: parse_int_param(fields.get("mileage").map(String::as_str))?,
        service_type: text("service_type").unwrap_or_default(),
        description: text("description"),
        cost: parse_float_param(fields.get("cost").map(String::as_str))?,
        attachment: None,
    };
    Ok((input, upload))
}

/// Keep ASCII letters, digits, dot, dash and underscore; replace the rest
pub(crate) fn sanitize_file_name(name: &str) -> String {
    // Some clients send a full path as the file name
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// Validate the extension and build
/// `<UTC timestamp with microseconds>_<random hex>_<sanitized name>`
pub(crate) fn stored_attachment_name(original: &str) -> Result<String, AppError> {
    let sanitized = sanitize_file_name(original);
    let extension = FsPath::new(&sanitized)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension {
        Some(ext) if ALLOWED_ATTACHMENT_EXTENSIONS.contains(&ext.as_str()) => Ok(format!(
            "{}_{:08x}_{}",
            chrono::Utc::now().format("%Y%m%dT%H%M%S%6f"),
            rand::thread_rng().gen::<u32>(),
            sanitized
        )),
        _ => Err(AppError::bad_request("file_type_not_allowed")),
    }
}

/// Write `data` to a file that must not exist yet
async fn write_new_file(path: &FsPath, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.flush().await
}

async fn remove_attachment(uploads_dir: &FsPath, stored: &str) {
    if let Err(e) = tokio::fs::remove_file(uploads_dir.join(stored)).await {
        warn!(file = %stored, "Failed to remove attachment: {}", e);
    }
}
