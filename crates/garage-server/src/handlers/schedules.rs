//! Service schedule handlers
//!
//! Both create and update return the stored record, including the derived
//! `next_due_date` / `next_due_mileage`.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Extension, Json,
};
use tracing::debug;

use garage_core::models::{NewSchedule, SchedulePatch, ServiceSchedule};

use super::read_json;
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// GET /api/schedules - List schedules, soonest due first
pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ServiceSchedule>>, AppError> {
    Ok(Json(state.db.list_schedules(current.id())?))
}

/// POST /api/schedules - Create a schedule and derive its next due point
pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<ServiceSchedule>, AppError> {
    let body: NewSchedule = read_json(request).await?;
    let schedule = state.db.create_schedule(current.id(), &body)?;
    debug!(
        schedule_id = schedule.id,
        next_due_date = ?schedule.next_due_date,
        next_due_mileage = ?schedule.next_due_mileage,
        "Created schedule"
    );
    Ok(Json(schedule))
}

/// PUT /api/schedules/:id - Patch a schedule and re-derive what it touches
pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<ServiceSchedule>, AppError> {
    let patch: SchedulePatch = read_json(request).await?;
    Ok(Json(state.db.update_schedule(current.id(), id, patch)?))
}

/// DELETE /api/schedules/:id - Delete a schedule
pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_schedule(current.id(), id)? {
        return Err(AppError::not_found("not_found"));
    }
    Ok(SuccessResponse::ok())
}
