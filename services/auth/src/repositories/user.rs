//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use async_trait::async_trait;
use common::{
    directory::UserDirectory,
    error::{DatabaseError, DirectoryError},
    user::User,
    validation::{is_email_identifier, normalize_email},
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::UserRow;

const USER_COLUMNS: &str = r#"
    id, id_number, email, password AS password_hash, full_name, role,
    profile_picture, created_at
"#;

/// Account lookups needed by the login endpoint
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by email (case-insensitive) or ID number
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRow>>;
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for UserRepository {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRow>> {
        let identifier = identifier.trim();
        info!("Finding user by identifier: {}", identifier);

        let row = if is_email_identifier(identifier) {
            let query = format!("SELECT {} FROM users WHERE LOWER(email) = $1", USER_COLUMNS);
            sqlx::query_as::<_, UserRow>(&query)
                .bind(normalize_email(identifier))
                .fetch_optional(&self.pool)
                .await?
        } else {
            let query = format!("SELECT {} FROM users WHERE id_number = $1", USER_COLUMNS);
            sqlx::query_as::<_, UserRow>(&query)
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?
        };

        Ok(row)
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn count_by_email(&self, email: &str) -> Result<u64, DirectoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DirectoryError::Database(DatabaseError::Query(e)))?;

        Ok(count.max(0) as u64)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DirectoryError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DirectoryError::Database(DatabaseError::Query(e)))?;

        Ok(row.map(UserRow::into_user))
    }
}

/// Hash a password with Argon2 and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(hash)
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
