//! User row and login payload

use chrono::{DateTime, Utc};
use common::user::User;
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `users` table, including the password hash
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub id_number: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRow {
    /// Strip the password hash and map to the public model
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            id_number: self.id_number,
            email: self.email,
            full_name: self.full_name,
            role: self.role,
            profile_picture: self.profile_picture.filter(|url| !url.is_empty()),
            created_at: self.created_at,
        }
    }
}

/// Body of `POST /api/login`
#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}
