//! Mailer service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use common::validation::validate_email;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    dispatcher::{DeliveryReport, DispatchError, Mailer, PasswordResetEmail},
    templates::validate_reset_url,
};

/// Create the router for the mailer service
pub fn create_router(mailer: Arc<Mailer>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/email/password-reset", post(send_password_reset))
        .with_state(mailer)
}

/// Health check endpoint
pub async fn health_check(State(mailer): State<Arc<Mailer>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mailer-service",
        "configured": mailer.is_configured()
    }))
}

/// Password-reset email endpoint
pub async fn send_password_reset(
    State(mailer): State<Arc<Mailer>>,
    payload: Result<Json<PasswordResetEmail>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => {
            warn!("Rejected password reset body: {}", e);
            return rejected("Invalid request body");
        }
    };

    if let Err(message) = validate_email(&request.to) {
        return rejected(&message);
    }

    if let Err(message) = validate_reset_url(&request.reset_url) {
        return rejected(&message);
    }

    info!("Password reset email requested for {}", request.to);

    let result = mailer.send_password_reset_email(&request).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(DispatchError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
        Err(DispatchError::Provider(_) | DispatchError::Transport) => StatusCode::BAD_GATEWAY,
    };

    (status, Json(DeliveryReport::from(&result)))
}

fn rejected(message: &str) -> (StatusCode, Json<DeliveryReport>) {
    (
        StatusCode::BAD_REQUEST,
        Json(DeliveryReport {
            success: false,
            error: Some(message.to_string()),
        }),
    )
}
