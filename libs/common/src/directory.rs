//! Read-only access to the relational user table

use async_trait::async_trait;
use uuid::Uuid;

use crate::{error::DirectoryError, user::User};

/// Lookups against the application's own user table
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Count users registered with `email`
    ///
    /// Implementations must only ever request a count, never row data.
    async fn count_by_email(&self, email: &str) -> Result<u64, DirectoryError>;

    /// Fetch the canonical profile for `id`
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DirectoryError>;
}
