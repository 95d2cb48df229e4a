//! Reminder handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Extension, Json,
};
use chrono::Local;

use garage_core::models::{NewReminder, Reminder, ReminderPatch, ReminderView};

use super::read_json;
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// GET /api/reminders - List reminders with their due flag for today
pub async fn list_reminders(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ReminderView>>, AppError> {
    let today = Local::now().date_naive();
    Ok(Json(state.db.list_reminders(current.id(), today)?))
}

/// POST /api/reminders - Create a reminder
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<Reminder>, AppError> {
    let body: NewReminder = read_json(request).await?;
    Ok(Json(state.db.create_reminder(current.id(), &body)?))
}

/// PUT /api/reminders/:id - Partially update a reminder
pub async fn update_reminder(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Reminder>, AppError> {
    let patch: ReminderPatch = read_json(request).await?;
    Ok(Json(state.db.update_reminder(current.id(), id, patch)?))
}

/// DELETE /api/reminders/:id - Delete a reminder
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_reminder(current.id(), id)? {
        return Err(AppError::not_found("not_found"));
    }
    Ok(SuccessResponse::ok())
}
