//! Mailer configuration

use anyhow::Result;
use std::net::SocketAddr;
use url::Url;

/// Default Resend API endpoint
pub const DEFAULT_API_URL: &str = "https://api.resend.com";

/// Mailer settings read at startup
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Provider API key; `None` leaves the mailer unconfigured
    pub api_key: Option<String>,
    pub api_url: Url,
    pub from_email: String,
    pub from_name: String,
    pub bind_addr: SocketAddr,
}

impl MailerConfig {
    /// Create a new MailerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `RESEND_API_KEY`: Provider API key (optional; empty counts as unset)
    /// - `RESEND_API_URL`: Provider base URL (default: "https://api.resend.com")
    /// - `FROM_EMAIL`: Sender address (default: "onboarding@resend.dev")
    /// - `FROM_NAME`: Sender display name (default: "Attendance System")
    /// - `MAILER_BIND_ADDR`: Listen address (default: "0.0.0.0:3002")
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("RESEND_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let raw_url =
            std::env::var("RESEND_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_url)
            .map_err(|e| anyhow::anyhow!("Invalid RESEND_API_URL {}: {}", raw_url, e))?;

        let raw_addr =
            std::env::var("MAILER_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3002".to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid MAILER_BIND_ADDR {}: {}", raw_addr, e))?;

        Ok(Self {
            api_key,
            api_url,
            from_email: std::env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "onboarding@resend.dev".to_string()),
            from_name: std::env::var("FROM_NAME")
                .unwrap_or_else(|_| "Attendance System".to_string()),
            bind_addr,
        })
    }

    /// `From` header value, e.g. `Attendance System <onboarding@resend.dev>`
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            std::env::remove_var("RESEND_API_KEY");
            std::env::remove_var("RESEND_API_URL");
            std::env::remove_var("FROM_EMAIL");
            std::env::remove_var("FROM_NAME");
            std::env::remove_var("MAILER_BIND_ADDR");
        }
    }

    #[test]
    #[serial]
    fn test_mailer_config_defaults() {
        clear_env();

        let config = MailerConfig::from_env().unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_url.as_str(), "https://api.resend.com/");
        assert_eq!(config.sender(), "Attendance System <onboarding@resend.dev>");
        assert_eq!(config.bind_addr.port(), 3002);
    }

    #[test]
    #[serial]
    fn test_mailer_config_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("RESEND_API_KEY", "re_test");
            std::env::set_var("FROM_EMAIL", "noreply@school.edu");
            std::env::set_var("FROM_NAME", "Registrar");
        }

        let config = MailerConfig::from_env().unwrap();
        assert_eq!(config.api_key.as_deref(), Some("re_test"));
        assert_eq!(config.sender(), "Registrar <noreply@school.edu>");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_api_key_counts_as_missing() {
        clear_env();
        unsafe {
            std::env::set_var("RESEND_API_KEY", "  ");
        }

        assert_eq!(MailerConfig::from_env().unwrap().api_key, None);

        clear_env();
    }
}
