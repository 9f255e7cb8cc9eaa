//! Session context for the signed-in user
//!
//! [`SessionContext`] is created once per client and handed to whatever needs
//! the current user. It owns the in-memory copy of the user, the persisted
//! copy in [`SessionStorage`], and the per-session query cache.
//!
//! The in-memory state is behind a `std::sync::Mutex` that is only locked
//! between awaits, never across one.

use common::{
    directory::UserDirectory,
    error::StoreError,
    user::{LoginCredentials, User},
};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{ApiError, AuthApi},
    notice::Notice,
    route::Route,
    storage::SessionStorage,
};

/// Message shown when the server rejects a login without saying why
pub const GENERIC_LOGIN_FAILURE: &str = "Invalid email/ID number or password";

#[derive(Error, Debug)]
pub enum SessionError {
    /// Credentials were rejected; the message is safe to show
    #[error("{0}")]
    Authentication(String),

    /// The login API could not be reached
    #[error("Unable to reach the server. Please try again.")]
    Network(#[source] ApiError),

    /// The user could not be persisted
    #[error("Could not save your session: {0}")]
    Storage(#[from] StoreError),
}

impl SessionError {
    pub fn notice(&self) -> Notice {
        Notice::destructive("Login Failed", self.to_string())
    }
}

impl From<ApiError> for SessionError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Rejected { message, .. } => SessionError::Authentication(
                message.unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string()),
            ),
            transport @ ApiError::Transport(_) => SessionError::Network(transport),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub redirect: Route,
    pub notice: Notice,
}

/// Result of a logout, which always succeeds for the caller
#[derive(Debug, Clone)]
pub struct LogoutOutcome {
    pub redirect: Route,
    pub notice: Notice,
}

#[derive(Default)]
struct SessionState {
    user: Option<User>,
    restored: bool,
    logging_in: bool,
    logging_out: bool,
    queries: HashMap<String, Value>,
}

/// Signed-in user, its persistence, and the login/logout/refresh operations
pub struct SessionContext {
    api: Arc<dyn AuthApi>,
    directory: Arc<dyn UserDirectory>,
    storage: SessionStorage,
    state: Mutex<SessionState>,
}

impl SessionContext {
    pub fn new(
        api: Arc<dyn AuthApi>,
        directory: Arc<dyn UserDirectory>,
        storage: SessionStorage,
    ) -> Self {
        Self {
            api,
            directory,
            storage,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the persisted user into memory
    ///
    /// Until this has run, [`is_loading`](Self::is_loading) reports `true`.
    pub async fn restore(&self) -> Option<User> {
        let stored = self.storage.load().await;

        let mut state = self.state();
        state.user = stored.clone();
        state.restored = true;
        stored
    }

    /// The signed-in user, if any
    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        !self.state().restored
    }

    pub fn is_logging_in(&self) -> bool {
        self.state().logging_in
    }

    pub fn is_logging_out(&self) -> bool {
        self.state().logging_out
    }

    /// Sign in with `credentials`
    ///
    /// On failure nothing is written: a previously signed-in user stays in
    /// place until a later successful login or an explicit logout.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, SessionError> {
        self.state().logging_in = true;
        let result = self.authenticate(credentials).await;
        self.state().logging_in = false;

        match &result {
            Ok(outcome) => info!("Signed in as user {}", outcome.user.id),
            Err(e) => info!("Login failed: {}", e),
        }

        result
    }

    async fn authenticate(&self, credentials: LoginCredentials) -> Result<LoginOutcome, SessionError> {
        let payload = self.api.login(&credentials).await?;
        drop(credentials);

        let user = payload.into_user();
        self.storage.save(&user).await?;

        {
            let mut state = self.state();
            state.user = Some(user.clone());
            state.restored = true;
        }

        let notice = Notice::info("Welcome back!", format!("Logged in as {}", user.full_name));
        Ok(LoginOutcome {
            user,
            redirect: Route::Dashboard,
            notice,
        })
    }

    /// Sign out
    ///
    /// Local state is cleared before the server is told, and a failed server
    /// call does not stop the logout.
    pub async fn logout(&self) -> LogoutOutcome {
        {
            let mut state = self.state();
            state.logging_out = true;
            state.user = None;
        }

        if let Err(e) = self.storage.clear().await {
            warn!("Failed to clear stored session: {}", e);
        }

        if let Err(e) = self.api.logout().await {
            warn!("Server logout failed (non-blocking): {}", e);
        }

        {
            let mut state = self.state();
            state.user = None;
            state.queries.clear();
            state.logging_out = false;
        }

        info!("Signed out");
        LogoutOutcome {
            redirect: Route::Login,
            notice: Notice::info("Logged out", "See you next time!"),
        }
    }

    /// Re-read the signed-in user from the user table
    ///
    /// Picks up profile edits made elsewhere. Failures are logged and leave
    /// the current session unchanged.
    pub async fn refresh(&self) -> Option<User> {
        let stored = self.storage.load().await?;

        let user = match self.directory.find_user(stored.id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("User {} no longer found during refresh", stored.id);
                return None;
            }
            Err(e) => {
                warn!("Failed to refresh user {}: {}", stored.id, e);
                return None;
            }
        };

        if let Err(e) = self.storage.save(&user).await {
            warn!("Failed to persist refreshed user: {}", e);
        }

        self.state().user = Some(user.clone());
        Some(user)
    }

    /// Remember a query result for the rest of this session
    pub fn cache_query(&self, key: impl Into<String>, value: Value) {
        self.state().queries.insert(key.into(), value);
    }

    pub fn cached_query(&self, key: &str) -> Option<Value> {
        self.state().queries.get(key).cloned()
    }
}
