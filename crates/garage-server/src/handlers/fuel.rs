//! Fuel log handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Extension, Json,
};

use garage_core::models::{FuelLog, NewFuelLog};

use super::{read_json, VehicleQuery};
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// GET /api/fuel - List fill-ups (optional `vehicle_id` filter)
pub async fn list_fuel_logs(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<VehicleQuery>,
) -> Result<Json<Vec<FuelLog>>, AppError> {
    let logs = state.db.list_fuel_logs(current.id(), params.vehicle_id()?)?;
    Ok(Json(logs))
}

/// POST /api/fuel - Record a fill-up
pub async fn create_fuel_log(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<FuelLog>, AppError> {
    let body: NewFuelLog = read_json(request).await?;
    Ok(Json(state.db.create_fuel_log(current.id(), &body)?))
}

/// DELETE /api/fuel/:id - Delete a fill-up
pub async fn delete_fuel_log(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_fuel_log(current.id(), id)? {
        return Err(AppError::not_found("not_found"));
    }
    Ok(SuccessResponse::ok())
}
