// 🌐 HTTP Boundary - axum routes over the core
//
// Thin handlers: extract, authenticate, delegate, wrap. Every failure maps to
// its taxonomy status; 500s are logged and replaced with a generic message.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::auth::{self, AuthContext, TokenKeys, TOKEN_TTL_SECS};
use crate::dashboard::{self, DEFAULT_PAGE_SIZE};
use crate::db;
use crate::entities::Decision;
use crate::error::GatewayError;
use crate::gateway;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub keys: TokenKeys,
}

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    fn fail(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Error wrapper so core failures render with their taxonomy status.
pub struct ApiError(GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal faults get logged; callers only see a generic message.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {:#}", self.0);
            "An internal server error occurred.".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ApiResponse::fail(message))).into_response()
    }
}

// ============================================================================
// CREDENTIAL EXTRACTION
// ============================================================================

/// Pull the credential token from the `token` cookie, falling back to an
/// `Authorization: Bearer` header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == "token" && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

/// Resolve the caller's identity and role from the request, or fail 401.
/// The role is taken from the verified token only - request fields never
/// carry authority.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthContext, ApiError> {
    let token = extract_token(headers).ok_or(GatewayError::Unauthenticated)?;
    Ok(auth::verify_token(&state.keys, &token)?)
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/auth/signup - Register an account
async fn signup(
    State(state): State<AppState>,
    Json(body): Json<auth::SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let conn = state.db.lock().unwrap();
    let account = auth::signup(&conn, &body)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(account))))
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    role: crate::entities::Role,
}

/// POST /api/auth/login - Authenticate and set the credential cookie
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let conn = state.db.lock().unwrap();
    let (token, role) = auth::login(&conn, &state.keys, &body.email, &body.password)?;

    let cookie = format!(
        "token={token}; HttpOnly; Secure; SameSite=Strict; Max-Age={TOKEN_TTL_SECS}; Path=/"
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::ok(LoginResponse { role })),
    ))
}

/// GET /api/dashboard - Role-scoped stats and newest visible projects
async fn get_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = authenticate(&state, &headers)?;
    let conn = state.db.lock().unwrap();
    let data = dashboard::dashboard_for(&conn, ctx.role, &ctx.account_id, DEFAULT_PAGE_SIZE)?;
    Ok(Json(ApiResponse::ok(data)))
}

/// GET /api/projects - All projects, newest first
async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    authenticate(&state, &headers)?;
    let conn = state.db.lock().unwrap();
    let projects = db::list_projects(&conn)?;
    Ok(Json(ApiResponse::ok(projects)))
}

/// POST /api/projects - Submit a project (startup only)
async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<gateway::CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = authenticate(&state, &headers)?;
    let conn = state.db.lock().unwrap();
    let project = gateway::create_project(&conn, &ctx, &body)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(project))))
}

#[derive(Deserialize)]
struct ApproveRequest {
    #[serde(default)]
    decision: String,
}

/// POST /api/projects/:id/approve - Record the caller role's decision
async fn approve_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
    Json(body): Json<ApproveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = authenticate(&state, &headers)?;

    let decision = Decision::parse(&body.decision).ok_or_else(|| {
        GatewayError::Validation(format!("'{}' is not a valid decision.", body.decision))
    })?;

    let mut conn = state.db.lock().unwrap();
    let project = gateway::approve_project(&mut conn, &ctx, &project_id, decision)?;
    Ok(Json(ApiResponse::ok(project)))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the full router with all routes and the CORS layer.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/dashboard", get(get_dashboard))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id/approve", post(approve_project))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; token=abc.def.ghi; lang=en".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_missing() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "token=".parse().unwrap());
        assert_eq!(extract_token(&headers), None);
    }
}
