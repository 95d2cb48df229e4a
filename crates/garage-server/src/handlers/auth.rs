//! Registration, login and session handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use garage_core::models::{NewUser, User};

use super::read_json;
use crate::{session, AppError, AppState, CurrentUser, SuccessResponse};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub user: User,
}

/// POST /api/register - Create an account
pub async fn register(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let body: NewUser = read_json(request).await?;
    let user = state.db.create_user(&body)?;
    info!(user_id = user.id, "Registered new user");
    Ok(SuccessResponse::ok())
}

/// POST /api/login - Verify credentials and start a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let body: LoginRequest = read_json(request).await?;

    let user = state.db.authenticate(&body.email, &body.password)?;

    if let Err(e) = state.db.purge_expired_sessions() {
        warn!("Failed to purge expired sessions: {}", e);
    }
    let token = state
        .db
        .create_session(user.id, state.config.session_ttl_hours)?;
    let cookie = session::session_cookie(
        &token,
        state.config.session_ttl_hours,
        state.config.secure_cookies,
    );

    Ok((
        CookieJar::new().add(cookie),
        Json(LoginResponse { ok: true, user }),
    ))
}

/// POST /api/logout - End the current session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<(CookieJar, Json<SuccessResponse>), AppError> {
    state.db.delete_session(&current.token)?;
    let cookie = session::clear_cookie(state.config.secure_cookies);
    Ok((CookieJar::new().add(cookie), SuccessResponse::ok()))
}

/// GET /api/me - The logged-in user
pub async fn get_me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}
