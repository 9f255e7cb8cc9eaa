//! Client-side authentication for the attendance application
//!
//! Two entry points:
//!
//! - [`session::SessionContext`] keeps the signed-in user, persists it
//!   across restarts and drives login, logout and profile refresh.
//! - [`recovery::ForgotPasswordFlow`] runs the password-recovery form
//!   without ever revealing whether an email is registered.
//!
//! Both talk to the outside world only through the seams in [`api`],
//! [`identity`] and [`common::directory`], so they can be wired to real
//! HTTP clients or to fakes.

pub mod api;
pub mod config;
pub mod directory;
pub mod identity;
pub mod notice;
pub mod recovery;
pub mod route;
pub mod session;
pub mod storage;

pub use config::ClientConfig;
pub use notice::Notice;
pub use recovery::{ForgotPasswordFlow, RecoveryError, RecoveryOrigin, RecoveryState};
pub use route::Route;
pub use session::{LoginOutcome, LogoutOutcome, SessionContext, SessionError};
