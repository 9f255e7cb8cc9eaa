//! Resend email provider client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

/// A fully rendered message ready for delivery
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider refused the message
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a usable response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Transactional email delivery
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Deliver a message and return the provider's message id
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ProviderError>;
}

#[derive(Deserialize)]
struct SentBody {
    id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// reqwest-backed [`EmailProvider`] for the Resend API
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ResendClient {
    pub fn new(base_url: &Url, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl EmailProvider for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("Email provider returned status {}", status.as_u16()));

            return Err(ProviderError::Rejected(message));
        }

        // Accepted from here on
        match response.json::<SentBody>().await {
            Ok(body) => Ok(body.id),
            Err(e) => {
                warn!("Email accepted but the response had no message id: {}", e);
                Ok(String::new())
            }
        }
    }
}
