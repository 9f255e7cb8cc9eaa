//! User model and boundary mapping
//!
//! [`User`] is the only shape used inside the workspace. Records that arrive
//! from servers are decoded as [`UserPayload`], which accepts both camelCase
//! and snake_case keys, and converted once by [`UserPayload::into_user`].
//! `User` has no password field, so a normalized record can never carry one.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub id_number: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// First word of the display name
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or_default()
    }
}

/// User record as sent by a server
///
/// Unknown keys, including any `password` the server failed to strip, are
/// dropped during decoding. When a record carries both spellings of a field
/// the camelCase value wins, unless it is empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawUserPayload")]
pub struct UserPayload {
    id: Uuid,
    id_number: String,
    email: String,
    full_name: String,
    role: String,
    profile_picture: Option<String>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct RawUserPayload {
    id: Uuid,
    email: String,
    role: String,
    #[serde(rename = "idNumber")]
    id_number_camel: Option<String>,
    id_number: Option<String>,
    #[serde(rename = "fullName")]
    full_name_camel: Option<String>,
    full_name: Option<String>,
    #[serde(rename = "profilePicture")]
    profile_picture_camel: Option<String>,
    profile_picture: Option<String>,
    #[serde(rename = "createdAt")]
    created_at_camel: Option<String>,
    created_at: Option<String>,
}

fn prefer(camel: Option<String>, snake: Option<String>) -> Option<String> {
    camel.filter(|value| !value.is_empty()).or(snake)
}

impl TryFrom<RawUserPayload> for UserPayload {
    type Error = String;

    fn try_from(raw: RawUserPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            id_number: prefer(raw.id_number_camel, raw.id_number)
                .ok_or("missing field `idNumber`")?,
            email: raw.email,
            full_name: prefer(raw.full_name_camel, raw.full_name)
                .ok_or("missing field `fullName`")?,
            role: raw.role,
            profile_picture: prefer(raw.profile_picture_camel, raw.profile_picture),
            created_at: prefer(raw.created_at_camel, raw.created_at),
        })
    }
}

impl UserPayload {
    /// Map the wire record into the internal model
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            id_number: self.id_number,
            email: self.email,
            full_name: self.full_name,
            role: self.role,
            profile_picture: self.profile_picture.filter(|url| !url.is_empty()),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

/// Parse RFC 3339 timestamps, falling back to naive timestamps read as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Login credentials, submitted once and then dropped
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub identifier: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}
