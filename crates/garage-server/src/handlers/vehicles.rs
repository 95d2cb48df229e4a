//! Vehicle handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Extension, Json,
};

use garage_core::models::{NewVehicle, Vehicle};

use super::read_json;
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// GET /api/vehicles - List the user's vehicles, newest first
pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    Ok(Json(state.db.list_vehicles(current.id())?))
}

/// POST /api/vehicles - Add a vehicle
pub async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<Vehicle>, AppError> {
    let body: NewVehicle = read_json(request).await?;
    Ok(Json(state.db.create_vehicle(current.id(), &body)?))
}

/// GET /api/vehicles/:id - Fetch one vehicle
pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Vehicle>, AppError> {
    state
        .db
        .get_vehicle(current.id(), id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("not_found"))
}

/// DELETE /api/vehicles/:id - Delete a vehicle and everything recorded for it
pub async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_vehicle(current.id(), id)? {
        return Err(AppError::not_found("not_found"));
    }
    Ok(SuccessResponse::ok())
}
