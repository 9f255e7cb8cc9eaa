//! Identity service client
//!
//! The identity service owns credentials and password-reset tokens; it is
//! separate from the application's user table. The HTTP implementation
//! speaks the GoTrue API (`/auth/v1/signup`, `/auth/v1/recover`).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Identity service rate limit reached: {0}")]
    RateLimited(String),

    #[error("Identity service returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Identity service request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl IdentityError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, IdentityError::RateLimited(_))
    }

    /// Classify a non-success answer from the service
    fn from_response(status: StatusCode, message: String) -> Self {
        let lowered = message.to_lowercase();
        if status == StatusCode::TOO_MANY_REQUESTS
            || lowered.contains("rate")
            || lowered.contains("limit")
        {
            IdentityError::RateLimited(message)
        } else {
            IdentityError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Account provisioning and reset-token issuance
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register `email`; registering a known address is not an error
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), IdentityError>;

    /// Email a password-reset link that lands on `redirect_to`
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError>;
}

/// Error body variants returned by GoTrue
#[derive(Deserialize, Default)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// reqwest-backed [`IdentityProvider`]
#[derive(Clone)]
pub struct GoTrueClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(base_url: &url::Url, anon_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn check(response: reqwest::Response) -> Result<(), IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .unwrap_or_default()
            .into_message()
            .unwrap_or_else(|| status.to_string());

        Err(IdentityError::from_response(status, message))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let response = self
            .post("signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::check(response).await
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError> {
        let response = self
            .post("recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;

        Self::check(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GoTrueClient {
        let base = url::Url::parse(&server.uri()).expect("mock server uri");
        GoTrueClient::new(&base, "anon-key")
    }

    #[test]
    fn test_rate_limit_classification() {
        assert!(
            IdentityError::from_response(StatusCode::TOO_MANY_REQUESTS, "slow down".into())
                .is_rate_limited()
        );
        assert!(
            IdentityError::from_response(
                StatusCode::BAD_REQUEST,
                "Email rate limit exceeded".into()
            )
            .is_rate_limited()
        );
        assert!(
            !IdentityError::from_response(StatusCode::BAD_REQUEST, "Invalid email".into())
                .is_rate_limited()
        );
    }

    #[tokio::test]
    async fn test_recover_sends_redirect() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .and(query_param(
                "redirect_to",
                "https://dlsuqr.vercel.app/reset-password",
            ))
            .and(header("apikey", "anon-key"))
            .and(body_json(serde_json::json!({ "email": "ana@school.edu" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .reset_password_for_email("ana@school.edu", "https://dlsuqr.vercel.app/reset-password")
            .await
            .expect("recover");
    }

    #[tokio::test]
    async fn test_recover_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "code": 429,
                "error_code": "over_email_send_rate_limit",
                "msg": "email rate limit exceeded"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .reset_password_for_email("ana@school.edu", "http://localhost:5000/reset-password")
            .await
            .expect_err("rate limited");
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_signup_error_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "msg": "Signups not allowed for this instance"
            })))
            .mount(&server)
            .await;

        match client_for(&server).sign_up("ana@school.edu", "temp").await {
            Err(IdentityError::Api { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "Signups not allowed for this instance");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
