//! Forgot-password flow
//!
//! The flow must never reveal whether an address is registered. Whether the
//! email exists, does not exist, or any step fails, the caller gets the same
//! "Request Received" notice. The single exception is a rate limit reported
//! by the identity service, which gets its own message so the user knows to
//! wait.
//!
//! Registered addresses may be unknown to the identity service, so the flow
//! signs them up with a random throwaway password before asking for the
//! reset email. Sign-up is idempotent on the service side.

use common::{
    directory::UserDirectory,
    validation::{normalize_email, validate_email},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::{identity::IdentityProvider, notice::Notice, route::Route};

pub const REQUEST_RECEIVED_TITLE: &str = "Request Received";
pub const REQUEST_RECEIVED_MESSAGE: &str =
    "If an account with that email exists, a reset link will be sent shortly.";
pub const RATE_LIMITED_TITLE: &str = "Too Many Requests";
pub const RATE_LIMITED_MESSAGE: &str =
    "Please wait a few minutes before requesting another reset email.";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("{0}")]
    InvalidEmail(String),

    #[error("Please wait a few minutes before requesting another reset email.")]
    RateLimited,
}

impl RecoveryError {
    pub fn notice(&self) -> Notice {
        match self {
            RecoveryError::InvalidEmail(message) => Notice::destructive("Invalid email", message),
            RecoveryError::RateLimited => {
                Notice::destructive(RATE_LIMITED_TITLE, RATE_LIMITED_MESSAGE)
            }
        }
    }
}

/// Page the recovery form was opened from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryOrigin {
    #[default]
    Login,
    Profile,
}

impl RecoveryOrigin {
    /// Read the origin from a page query string such as `from=profile`
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let from_profile = url::form_urlencoded::parse(query.as_bytes())
            .any(|(key, value)| key == "from" && value == "profile");

        if from_profile {
            RecoveryOrigin::Profile
        } else {
            RecoveryOrigin::Login
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            RecoveryOrigin::Login => "Forgot Password?",
            RecoveryOrigin::Profile => "Reset Password",
        }
    }

    pub fn back_route(&self) -> Route {
        match self {
            RecoveryOrigin::Login => Route::Login,
            RecoveryOrigin::Profile => Route::Profile,
        }
    }

    pub fn back_label(&self) -> &'static str {
        match self {
            RecoveryOrigin::Login => "Back to login",
            RecoveryOrigin::Profile => "Back",
        }
    }
}

/// Where reset links should land
///
/// Local development (`localhost` or `127.0.0.1`) uses the app's own origin;
/// everything else uses the deployed reset page.
#[derive(Debug, Clone)]
pub struct ResetRedirect {
    app_origin: Url,
    deployed_url: String,
}

impl ResetRedirect {
    pub fn new(app_origin: Url, deployed_url: impl Into<String>) -> Self {
        Self {
            app_origin,
            deployed_url: deployed_url.into(),
        }
    }

    pub fn target(&self) -> String {
        match self.app_origin.host_str() {
            Some("localhost") | Some("127.0.0.1") => format!(
                "{}{}",
                self.app_origin.origin().ascii_serialization(),
                Route::ResetPassword.path()
            ),
            _ => self.deployed_url.clone(),
        }
    }
}

/// Form state; `Submitted` lasts until the user asks to try another email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryState {
    Form,
    Submitted { email: String },
}

/// State machine behind the forgot-password page
pub struct ForgotPasswordFlow {
    directory: Arc<dyn UserDirectory>,
    identity: Arc<dyn IdentityProvider>,
    redirect: ResetRedirect,
    origin: RecoveryOrigin,
    state: RecoveryState,
    submitting: bool,
}

impl ForgotPasswordFlow {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        identity: Arc<dyn IdentityProvider>,
        redirect: ResetRedirect,
        origin: RecoveryOrigin,
    ) -> Self {
        Self {
            directory,
            identity,
            redirect,
            origin,
            state: RecoveryState::Form,
            submitting: false,
        }
    }

    pub fn state(&self) -> &RecoveryState {
        &self.state
    }

    pub fn origin(&self) -> RecoveryOrigin {
        self.origin
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Confirmation shown in the submitted state, echoing the entered address
    pub fn confirmation(&self) -> Option<String> {
        match &self.state {
            RecoveryState::Form => None,
            RecoveryState::Submitted { email } => Some(format!(
                "If an account exists for {}, you will receive a password reset link shortly.",
                email
            )),
        }
    }

    /// Return to the form so another address can be tried
    pub fn try_another_email(&mut self) {
        self.state = RecoveryState::Form;
    }

    /// Request a reset link for `email`
    ///
    /// Returns the generic confirmation for every outcome except an invalid
    /// address and an identity-service rate limit.
    pub async fn submit(&mut self, email: &str) -> Result<Notice, RecoveryError> {
        let entered = email.trim();
        validate_email(entered).map_err(RecoveryError::InvalidEmail)?;

        self.submitting = true;
        let result = self.request_reset(&normalize_email(entered)).await;
        self.submitting = false;

        result?;

        self.state = RecoveryState::Submitted {
            email: entered.to_string(),
        };
        Ok(Notice::info(REQUEST_RECEIVED_TITLE, REQUEST_RECEIVED_MESSAGE))
    }

    async fn request_reset(&self, email: &str) -> Result<(), RecoveryError> {
        let exists = match self.directory.count_by_email(email).await {
            Ok(count) => count > 0,
            Err(e) => {
                warn!("Existence check failed: {}", e);
                false
            }
        };

        if !exists {
            return Ok(());
        }

        let temporary_password = Uuid::new_v4().to_string();
        if let Err(e) = self.identity.sign_up(email, &temporary_password).await {
            debug!("Identity sign-up did not complete: {}", e);
        }

        match self
            .identity
            .reset_password_for_email(email, &self.redirect.target())
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_rate_limited() => Err(RecoveryError::RateLimited),
            Err(e) => {
                warn!("Reset request failed: {}", e);
                Ok(())
            }
        }
    }
}
