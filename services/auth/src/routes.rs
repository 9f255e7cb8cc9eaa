//! Authentication service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::{TypedHeader, headers::Cookie};
use common::validation::validate_identifier;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::{
    AppState,
    config::SESSION_COOKIE,
    models::LoginRequest,
    rate_limiter::ThrottleDecision,
    repositories::verify_password,
};

const INVALID_CREDENTIALS: &str = "Invalid email/ID number or password";

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/session", get(current_session))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Rejected login body: {}", e);
        AuthError::BadRequest("Invalid request body".to_string())
    })?;

    validate_identifier(&payload.identifier).map_err(AuthError::BadRequest)?;
    if payload.password.is_empty() {
        return Err(AuthError::BadRequest("Password is required".to_string()));
    }

    let throttle_key = payload.identifier.trim().to_lowercase();
    if let ThrottleDecision::Locked { retry_after } = state.throttle.check(&throttle_key).await {
        info!("Login attempt for locked identifier");
        return Err(AuthError::TooManyAttempts(retry_after));
    }

    info!("Login attempt for user: {}", payload.identifier.trim());

    let row = state
        .accounts
        .find_by_identifier(&payload.identifier)
        .await
        .map_err(|e| {
            error!("Failed to look up account: {}", e);
            AuthError::InternalServerError
        })?;

    let Some(row) = row else {
        state.throttle.record_failure(&throttle_key).await;
        return Err(AuthError::Unauthorized);
    };

    let verified = verify_password(&row.password_hash, &payload.password).map_err(|e| {
        error!("Failed to verify password for user {}: {}", row.id, e);
        AuthError::InternalServerError
    })?;

    if !verified {
        state.throttle.record_failure(&throttle_key).await;
        return Err(AuthError::Unauthorized);
    }

    state.throttle.record_success(&throttle_key).await;

    let token = state.sessions.create_session(row.id).await.map_err(|e| {
        error!("Failed to store session: {}", e);
        AuthError::InternalServerError
    })?;

    let cookie = session_cookie(&token, state.sessions.ttl_seconds(), state.config.cookie_secure);
    let user = row.into_user();
    info!("User {} logged in", user.id);

    Ok(([(header::SET_COOKIE, cookie)], Json(user)))
}

/// Logout endpoint
///
/// Always succeeds; a missing or unknown session simply has nothing to delete.
pub async fn logout(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
) -> impl IntoResponse {
    info!("Logout request");

    if let Some(token) = cookies.as_ref().and_then(|c| c.get(SESSION_COOKIE)) {
        if let Err(e) = state.sessions.delete_session(token).await {
            error!("Failed to delete session: {}", e);
        }
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, session_cookie("", 0, state.config.cookie_secure))],
    )
}

/// Current user behind the session cookie
pub async fn current_session(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
) -> Result<impl IntoResponse, AuthError> {
    let token = cookies
        .as_ref()
        .and_then(|c| c.get(SESSION_COOKIE))
        .ok_or(AuthError::NotAuthenticated)?;

    let session = state
        .sessions
        .get_session(token)
        .await
        .map_err(|e| {
            error!("Failed to read session: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::NotAuthenticated)?;

    let user = state
        .directory
        .find_user(session.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", session.user_id, e);
            AuthError::InternalServerError
        })?;

    match user {
        Some(user) => Ok(Json(user)),
        None => {
            // Account removed while the session was alive
            if let Err(e) = state.sessions.delete_session(token).await {
                error!("Failed to delete orphaned session: {}", e);
            }
            Err(AuthError::NotAuthenticated)
        }
    }
}

fn session_cookie(token: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Custom error type for authentication errors
#[derive(Debug)]
pub enum AuthError {
    BadRequest(String),
    Unauthorized,
    NotAuthenticated,
    TooManyAttempts(Duration),
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.to_string()),
            AuthError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            AuthError::TooManyAttempts(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts. Please try again later.".to_string(),
            ),
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "message": message,
        }));

        match self {
            AuthError::TooManyAttempts(retry_after) => (
                status,
                [(header::RETRY_AFTER, retry_after.as_secs().max(1).to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
