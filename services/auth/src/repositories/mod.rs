//! Repositories for database operations

pub mod user;

pub use user::{AccountStore, UserRepository, hash_password, verify_password};
