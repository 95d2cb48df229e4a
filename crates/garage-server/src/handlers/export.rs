//! CSV export and import of service entries

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::info;

use garage_core::ImportStats;

use crate::{AppError, AppState, CurrentUser, MAX_UPLOAD_SIZE};

/// GET /api/export/entries - Download the user's service entries as CSV
pub async fn export_entries(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let csv = state.db.export_entries_csv(current.id())?;
    let filename = format!(
        "garage-entries-{}.csv",
        chrono::Local::now().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response())
}

/// POST /api/import/entries - Import service entries from CSV
///
/// Accepts a multipart form with a `file` field or the raw CSV as the body.
pub async fn import_entries(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<ImportStats>, AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let data = if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|_| AppError::bad_request("invalid_multipart"))?;
        let mut data = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| AppError::bad_request("invalid_multipart"))?
        {
            if field.name() == Some("file") {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("invalid_multipart"))?;
                data = Some(bytes);
                break;
            }
        }
        data.ok_or_else(|| AppError::bad_request("missing_file"))?
    } else {
        axum::body::to_bytes(request.into_body(), MAX_UPLOAD_SIZE)
            .await
            .map_err(|_| AppError::bad_request("missing_file"))?
    };

    if data.is_empty() {
        return Err(AppError::bad_request("missing_file"));
    }

    let stats = state.db.import_entries_csv(current.id(), data.as_ref())?;
    info!(
        imported = stats.imported,
        skipped = stats.skipped,
        "CSV import finished"
    );
    Ok(Json(stats))
}
