//! Trip handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Extension, Json,
};

use garage_core::models::{NewTrip, Trip};

use super::{read_json, VehicleQuery};
use crate::{AppError, AppState, CurrentUser, SuccessResponse};

/// GET /api/trips - List trips (optional `vehicle_id` filter)
pub async fn list_trips(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<VehicleQuery>,
) -> Result<Json<Vec<Trip>>, AppError> {
    Ok(Json(state.db.list_trips(current.id(), params.vehicle_id()?)?))
}

/// POST /api/trips - Record a trip
pub async fn create_trip(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    request: Request,
) -> Result<Json<Trip>, AppError> {
    let body: NewTrip = read_json(request).await?;
    Ok(Json(state.db.create_trip(current.id(), &body)?))
}

/// DELETE /api/trips/:id - Delete a trip
pub async fn delete_trip(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_trip(current.id(), id)? {
        return Err(AppError::not_found("not_found"));
    }
    Ok(SuccessResponse::ok())
}
