//! Login API client
//!
//! Talks to `POST /api/login` and `POST /api/logout`. The HTTP client keeps a
//! cookie jar so the server's session cookie rides along with later calls.

use async_trait::async_trait;
use common::user::{LoginCredentials, UserPayload};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("Request rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },

    /// The request never produced a usable response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Server-side authentication endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for the signed-in user's record
    async fn login(&self, credentials: &LoginCredentials) -> Result<UserPayload, ApiError>;

    /// End the server-side session
    async fn logout(&self) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// reqwest-backed [`AuthApi`]
#[derive(Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: &url::Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<UserPayload, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/login"))
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies are optional; an unreadable one just means no message.
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .filter(|message| !message.is_empty());

            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<UserPayload>().await?)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = self.client.post(self.endpoint("/api/logout")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: None,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> HttpAuthApi {
        let base = url::Url::parse(&server.uri()).expect("mock server uri");
        HttpAuthApi::new(&base).expect("client")
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_json(json!({
                "identifier": "2021-00042",
                "password": "correct horse"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "6f1c2a8e-4b7d-4f0e-9c3a-2d5e8b1f7a90",
                "idNumber": "2021-00042",
                "email": "ana@school.edu",
                "fullName": "Ana Cruz",
                "role": "student"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = LoginCredentials::new("2021-00042", "correct horse");
        let user = api_for(&server)
            .login(&credentials)
            .await
            .expect("login")
            .into_user();
        assert_eq!(user.full_name, "Ana Cruz");
    }

    #[tokio::test]
    async fn test_login_surfaces_server_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Account locked" })),
            )
            .mount(&server)
            .await;

        let result = api_for(&server)
            .login(&LoginCredentials::new("ana@school.edu", "nope"))
            .await;

        match result {
            Err(ApiError::Rejected { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("Account locked"));
            }
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_login_tolerates_non_json_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let result = api_for(&server)
            .login(&LoginCredentials::new("ana@school.edu", "pw"))
            .await;

        assert!(matches!(
            result,
            Err(ApiError::Rejected {
                status: 500,
                message: None
            })
        ));
    }

    #[tokio::test]
    async fn test_logout_reports_failure_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = api_for(&server).logout().await;
        assert!(matches!(result, Err(ApiError::Rejected { status: 503, .. })));
    }
}
