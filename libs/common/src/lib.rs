//! Common library for the attendance authentication workspace
//!
//! This crate provides the pieces shared by the client library and the
//! services: database connectivity, key/value storage backends, the
//! canonical user model, the user directory seam and input validation.
//!
//! ```rust,no_run
//! use common::cache::{KeyValueStore, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     store.set("attendance_user", "{}", None).await?;
//!     assert!(store.get("attendance_user").await?.is_some());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod directory;
pub mod error;
pub mod user;
pub mod validation;
