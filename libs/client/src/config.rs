//! Client configuration

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Deployed reset page used whenever the app is not served from localhost
pub const DEFAULT_RESET_REDIRECT_URL: &str = "https://dlsuqr.vercel.app/reset-password";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Endpoints and storage location used by the client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin the application is served from
    pub app_origin: Url,
    /// Base URL of the login/logout API
    pub api_base_url: Url,
    /// Base URL of the identity service and user table
    pub identity_url: Url,
    /// Public API key for the identity service
    pub identity_anon_key: String,
    /// Reset page used outside local development
    pub reset_redirect_url: String,
    /// Directory holding the persisted session
    pub session_dir: PathBuf,
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `APP_ORIGIN`: Application origin (default: "http://localhost:5000")
    /// - `API_BASE_URL`: Login API base URL (default: `APP_ORIGIN`)
    /// - `IDENTITY_URL`: Identity service base URL (required)
    /// - `IDENTITY_ANON_KEY`: Identity service public key (required)
    /// - `RESET_REDIRECT_URL`: Deployed reset page
    ///   (default: "https://dlsuqr.vercel.app/reset-password")
    /// - `SESSION_DIR`: Session storage directory (default: ".attendance")
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_origin = url_from_env("APP_ORIGIN", Some("http://localhost:5000"))?;

        let api_base_url = match std::env::var("API_BASE_URL") {
            Ok(raw) => parse_url("API_BASE_URL", &raw)?,
            Err(_) => app_origin.clone(),
        };

        let identity_url = url_from_env("IDENTITY_URL", None)?;

        let identity_anon_key = std::env::var("IDENTITY_ANON_KEY")
            .map_err(|_| ConfigError::Missing("IDENTITY_ANON_KEY"))?;

        let reset_redirect_url = std::env::var("RESET_REDIRECT_URL")
            .unwrap_or_else(|_| DEFAULT_RESET_REDIRECT_URL.to_string());

        let session_dir = std::env::var("SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".attendance"));

        Ok(Self {
            app_origin,
            api_base_url,
            identity_url,
            identity_anon_key,
            reset_redirect_url,
            session_dir,
        })
    }
}

fn url_from_env(var: &'static str, default: Option<&str>) -> Result<Url, ConfigError> {
    let raw = match (std::env::var(var), default) {
        (Ok(raw), _) => raw,
        (Err(_), Some(default)) => default.to_string(),
        (Err(_), None) => return Err(ConfigError::Missing(var)),
    };
    parse_url(var, &raw)
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { var, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "APP_ORIGIN",
        "API_BASE_URL",
        "IDENTITY_URL",
        "IDENTITY_ANON_KEY",
        "RESET_REDIRECT_URL",
        "SESSION_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_client_config_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("IDENTITY_URL", "https://project.supabase.co");
            std::env::set_var("IDENTITY_ANON_KEY", "anon");
        }

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.app_origin.as_str(), "http://localhost:5000/");
        assert_eq!(config.api_base_url, config.app_origin);
        assert_eq!(config.reset_redirect_url, DEFAULT_RESET_REDIRECT_URL);
        assert_eq!(config.session_dir, PathBuf::from(".attendance"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_client_config_requires_identity_service() {
        clear_env();

        let result = ClientConfig::from_env();
        assert!(matches!(result, Err(ConfigError::Missing("IDENTITY_URL"))));

        unsafe {
            std::env::set_var("IDENTITY_URL", "not a url");
        }
        let result = ClientConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidUrl {
                var: "IDENTITY_URL",
                ..
            })
        ));

        clear_env();
    }
}
