//! Garage Web Server
//!
//! Axum-based REST API for the Garage vehicle maintenance logbook.
//!
//! Security features:
//! - Cookie sessions backed by the database (only token digests are stored)
//! - Every data route scoped to the logged-in user
//! - Restrictive CORS policy
//! - Upload size and file type limits
//! - Sanitized error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use garage_core::db::Database;
use garage_core::models::User;

mod handlers;
pub mod session;

/// Maximum request body for attachment uploads and CSV imports (20 MB)
pub const MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

/// Maximum JSON request body
pub const MAX_JSON_BODY: usize = 64 * 1024;

/// Default session lifetime (30 days)
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 720;

/// Routes reachable without a session
const PUBLIC_PATHS: [&str; 3] = ["/api/health", "/api/register", "/api/login"];

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Directory where entry attachments are written
    pub uploads_dir: PathBuf,
    /// How long a login session stays valid
    pub session_ttl_hours: i64,
    /// Mark the session cookie `Secure` (set when served over HTTPS)
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            uploads_dir: PathBuf::from("uploads"),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            secure_cookies: false,
        }
    }
}

/// Parse a comma-separated origin list (e.g. "https://a.example,https://b.example")
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// The logged-in user, placed in request extensions by the session middleware
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    /// Raw session token from the cookie (needed for logout)
    pub token: String,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// Session middleware - resolves the session cookie to a user
///
/// Non-API paths (static files) and the public API routes pass straight
/// through. Everything else under `/api` needs a live session.
async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !path.starts_with("/api/") || PUBLIC_PATHS.contains(&path) {
        return next.run(request).await;
    }

    let Some(token) = session::session_token(request.headers()) else {
        debug!(path = %path, "No session cookie");
        return AppError::unauthorized("auth_required").into_response();
    };

    match state.db.session_user(&token) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser { user, token });
            next.run(request).await
        }
        Ok(None) => {
            warn!(path = %request.uri().path(), "Rejected unknown or expired session");
            AppError::unauthorized("auth_required").into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub ok: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    let api_routes = Router::new()
        // Auth
        .route("/health", get(handlers::health_check))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::get_me))
        // Vehicles
        .route(
            "/vehicles",
            get(handlers::list_vehicles).post(handlers::create_vehicle),
        )
        .route(
            "/vehicles/:id",
            get(handlers::get_vehicle).delete(handlers::delete_vehicle),
        )
        // Service entries
        .route(
            "/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/entries/:id",
            put(handlers::update_entry).delete(handlers::delete_entry),
        )
        // Reminders
        .route(
            "/reminders",
            get(handlers::list_reminders).post(handlers::create_reminder),
        )
        .route(
            "/reminders/:id",
            put(handlers::update_reminder).delete(handlers::delete_reminder),
        )
        // Service schedules
        .route(
            "/schedules",
            get(handlers::list_schedules).post(handlers::create_schedule),
        )
        .route(
            "/schedules/:id",
            put(handlers::update_schedule).delete(handlers::delete_schedule),
        )
        // Fuel
        .route(
            "/fuel",
            get(handlers::list_fuel_logs).post(handlers::create_fuel_log),
        )
        .route("/fuel/:id", delete(handlers::delete_fuel_log))
        // Trips
        .route("/trips", get(handlers::list_trips).post(handlers::create_trip))
        .route("/trips/:id", delete(handlers::delete_trip))
        // Statistics
        .route("/stats", get(handlers::get_stats))
        // CSV
        .route("/export/entries", get(handlers::export_entries))
        .route("/import/entries", post(handlers::import_entries))
        // Attachments
        .route("/uploads/:name", get(handlers::get_upload));

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    // CSP: same-origin scripts, inline styles, blob:/data: images for attachment previews
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.secure_cookies {
        warn!("⚠️  Session cookies are not marked Secure - serve behind HTTPS in production");
    }

    std::fs::create_dir_all(&config.uploads_dir)?;

    match db.purge_expired_sessions() {
        Ok(count) if count > 0 => info!("Removed {} expired session(s)", count),
        Ok(_) => {}
        Err(e) => warn!("Failed to purge expired sessions: {}", e),
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
///
/// The response body is always `{"error": "<code>"}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(code: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            internal: None,
        }
    }

    pub fn not_found(code: &'static str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code,
            internal: None,
        }
    }

    pub fn unauthorized(code: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code,
            internal: None,
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "server_error",
            internal: Some(err.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.code
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        let mapped = match err.downcast_ref::<garage_core::Error>() {
            Some(garage_core::Error::Validation(code) | garage_core::Error::Conflict(code)) => {
                Some(Self::bad_request(*code))
            }
            Some(garage_core::Error::Unauthorized(code)) => Some(Self::unauthorized(*code)),
            Some(e @ (garage_core::Error::NotFound(_) | garage_core::Error::VehicleNotFound)) => {
                Some(Self::not_found(e.code()))
            }
            _ => None,
        };
        // Anything unmapped is internal: keep the full error for logging only
        mapped.unwrap_or_else(|| Self::internal(err))
    }
}
