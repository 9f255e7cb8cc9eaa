//! Authentication service configuration

use anyhow::Result;
use std::net::SocketAddr;

use crate::rate_limiter::ThrottleConfig;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "attendance_session";

/// Service settings read at startup
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Session lifetime in seconds
    pub session_ttl: u64,
    /// Whether the session cookie is marked `Secure`
    pub cookie_secure: bool,
    /// Failed-login throttling
    pub throttle: ThrottleConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            session_ttl: 604_800, // 7 days
            cookie_secure: false,
            throttle: ThrottleConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Create a new AuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_BIND_ADDR`: Listen address (default: "0.0.0.0:3000")
    /// - `SESSION_TTL_SECONDS`: Session lifetime (default: 604800)
    /// - `SESSION_COOKIE_SECURE`: "true" to mark the cookie Secure (default: false)
    /// - `LOGIN_MAX_ATTEMPTS`: Failures allowed per window (default: 5)
    /// - `LOGIN_WINDOW_SECONDS`: Failure counting window (default: 300)
    /// - `LOGIN_LOCKOUT_SECONDS`: Lockout after too many failures (default: 900)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = match std::env::var("AUTH_BIND_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid AUTH_BIND_ADDR {}: {}", raw, e))?,
            Err(_) => defaults.bind_addr,
        };

        Ok(Self {
            bind_addr,
            session_ttl: env_or("SESSION_TTL_SECONDS", defaults.session_ttl),
            cookie_secure: env_or("SESSION_COOKIE_SECURE", defaults.cookie_secure),
            throttle: ThrottleConfig {
                max_attempts: env_or("LOGIN_MAX_ATTEMPTS", defaults.throttle.max_attempts),
                window_seconds: env_or("LOGIN_WINDOW_SECONDS", defaults.throttle.window_seconds),
                lockout_seconds: env_or(
                    "LOGIN_LOCKOUT_SECONDS",
                    defaults.throttle.lockout_seconds,
                ),
            },
        })
    }
}

fn env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_auth_config_from_env_with_custom_values() {
        unsafe {
            std::env::set_var("AUTH_BIND_ADDR", "127.0.0.1:4000");
            std::env::set_var("SESSION_TTL_SECONDS", "3600");
            std::env::set_var("SESSION_COOKIE_SECURE", "true");
            std::env::set_var("LOGIN_MAX_ATTEMPTS", "3");
        }

        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:4000");
        assert_eq!(config.session_ttl, 3600);
        assert!(config.cookie_secure);
        assert_eq!(config.throttle.max_attempts, 3);
        assert_eq!(config.throttle.window_seconds, 300);

        unsafe {
            std::env::remove_var("AUTH_BIND_ADDR");
            std::env::remove_var("SESSION_TTL_SECONDS");
            std::env::remove_var("SESSION_COOKIE_SECURE");
            std::env::remove_var("LOGIN_MAX_ATTEMPTS");
        }
    }

    #[test]
    #[serial]
    fn test_auth_config_rejects_bad_bind_addr() {
        unsafe {
            std::env::set_var("AUTH_BIND_ADDR", "not-an-address");
        }

        assert!(AuthConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("AUTH_BIND_ADDR");
        }
    }
}
