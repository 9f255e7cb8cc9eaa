//! Transactional email for the attendance system
//!
//! [`dispatcher::Mailer`] renders the password-reset templates and hands the
//! message to an [`resend::EmailProvider`]. The HTTP surface in [`routes`]
//! exposes the dispatcher to other services.
//!
//! ```
//! use mailer::templates::ResetTemplate;
//!
//! let template = ResetTemplate::new("Ana Cruz", "https://example.com/reset", None, None);
//! assert_eq!(template.first_name, "Ana");
//! assert!(template.text().contains("https://example.com/reset"));
//! ```

pub mod config;
pub mod dispatcher;
pub mod resend;
pub mod routes;
pub mod templates;
