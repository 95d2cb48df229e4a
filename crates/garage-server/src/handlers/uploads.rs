//! Attachment download handler

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use tracing::warn;

use crate::{AppError, AppState, CurrentUser};

/// Content type served for a stored attachment, chosen by extension
pub(crate) fn attachment_content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// GET /api/uploads/:name - Download an attachment of one of the user's entries
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        warn!(name = %name, "Rejected attachment path");
        return Err(AppError::not_found("not_found"));
    }
    if !state.db.owns_attachment(current.id(), &name)? {
        return Err(AppError::not_found("not_found"));
    }

    let data = match tokio::fs::read(state.config.uploads_dir.join(&name)).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(name = %name, "Attachment recorded but missing on disk");
            return Err(AppError::not_found("not_found"));
        }
        Err(e) => return Err(AppError::internal(e)),
    };

    Ok((
        [(header::CONTENT_TYPE, attachment_content_type(&name))],
        data,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_content_type() {
        assert_eq!(attachment_content_type("20240101T000000_scan.PDF"), "application/pdf");
        assert_eq!(attachment_content_type("a.jpeg"), "image/jpeg");
        assert_eq!(attachment_content_type("a.webp"), "image/webp");
        assert_eq!(attachment_content_type("noext"), "application/octet-stream");
    }
}
