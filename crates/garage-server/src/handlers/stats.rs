//! Statistics handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Local;
use serde::Deserialize;

use garage_core::Statistics;

use super::parse_date_param;
use crate::{AppError, AppState, CurrentUser};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Only count entries and fill-ups on or after this date
    pub since: Option<String>,
}

/// GET /api/stats - Cost, mileage and fuel statistics
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<Statistics>, AppError> {
    let since = parse_date_param(params.since.as_deref())?;
    let today = Local::now().date_naive();
    Ok(Json(state.db.statistics(current.id(), today, since)?))
}
