//! Password-reset email dispatch

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    config::MailerConfig,
    resend::{EmailProvider, OutgoingEmail, ProviderError, ResendClient},
    templates::ResetTemplate,
};

/// Request to send a password-reset email
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetEmail {
    pub to: String,
    pub user_name: String,
    pub reset_url: String,
    pub system_name: Option<String>,
    pub school_name: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Email service not configured")]
    NotConfigured,

    /// Message reported by the provider
    #[error("{0}")]
    Provider(String),

    #[error("Failed to send email")]
    Transport,
}

/// Serializable outcome of a send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Result<String, DispatchError>> for DeliveryReport {
    fn from(result: &Result<String, DispatchError>) -> Self {
        match result {
            Ok(_) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Renders and hands password-reset emails to the provider
#[derive(Clone)]
pub struct Mailer {
    provider: Option<Arc<dyn EmailProvider>>,
    sender: String,
}

impl Mailer {
    /// `provider` is `None` when no API key is configured
    pub fn new(provider: Option<Arc<dyn EmailProvider>>, sender: impl Into<String>) -> Self {
        Self {
            provider,
            sender: sender.into(),
        }
    }

    /// Build a Resend-backed mailer, unconfigured when no API key is set
    pub fn from_config(config: &MailerConfig) -> Self {
        let provider = config.api_key.as_ref().map(|key| {
            Arc::new(ResendClient::new(&config.api_url, key.clone())) as Arc<dyn EmailProvider>
        });

        Self::new(provider, config.sender())
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Render and send a password-reset email, returning the provider message id
    pub async fn send_password_reset_email(
        &self,
        request: &PasswordResetEmail,
    ) -> Result<String, DispatchError> {
        let Some(provider) = &self.provider else {
            error!("RESEND_API_KEY is not set");
            return Err(DispatchError::NotConfigured);
        };

        let template = ResetTemplate::new(
            &request.user_name,
            &request.reset_url,
            request.system_name.as_deref(),
            request.school_name.as_deref(),
        );

        let email = OutgoingEmail {
            from: self.sender.clone(),
            to: vec![request.to.clone()],
            subject: template.subject(),
            html: template.html(),
            text: template.text(),
        };

        match provider.send(&email).await {
            Ok(id) => {
                info!("Password reset email sent successfully: {}", id);
                Ok(id)
            }
            Err(ProviderError::Rejected(message)) => {
                error!("Email provider rejected password reset email: {}", message);
                Err(DispatchError::Provider(message))
            }
            Err(ProviderError::Transport(e)) => {
                error!("Failed to send password reset email: {}", e);
                Err(DispatchError::Transport)
            }
        }
    }
}
