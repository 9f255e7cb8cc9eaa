//! PostgREST access to the user table
//!
//! The existence check issues a `HEAD` request with `Prefer: count=exact`,
//! so the response carries a row count in `Content-Range` and no body.

use async_trait::async_trait;
use common::{
    directory::UserDirectory,
    error::DirectoryError,
    user::{User, UserPayload},
};
use reqwest::{StatusCode, header};
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id,id_number,email,full_name,role,profile_picture,created_at";

/// [`UserDirectory`] over the PostgREST API of the identity project
#[derive(Clone)]
pub struct RestDirectory {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestDirectory {
    pub fn new(base_url: &url::Url, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn users_endpoint(&self) -> String {
        format!("{}/rest/v1/users", self.base_url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Read the total from a `Content-Range` value such as `0-0/3` or `*/0`
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit_once('/')?.1.trim().parse().ok()
}

fn transport(e: reqwest::Error) -> DirectoryError {
    DirectoryError::Transport(e.to_string())
}

#[async_trait]
impl UserDirectory for RestDirectory {
    async fn count_by_email(&self, email: &str) -> Result<u64, DirectoryError> {
        let filter = format!("eq.{}", email);
        let response = self
            .authorized(self.client.head(self.users_endpoint()))
            .query(&[("select", "*"), ("email", filter.as_str())])
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                message: "count request rejected".to_string(),
            });
        }

        response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_total)
            .ok_or_else(|| DirectoryError::Decode("missing row count".to_string()))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DirectoryError> {
        let filter = format!("eq.{}", id);
        let response = self
            .authorized(self.client.get(self.users_endpoint()))
            .query(&[("select", PROFILE_COLUMNS), ("id", filter.as_str())])
            .header(header::ACCEPT, "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        // A single-object request with zero matching rows is answered with 406.
        if status == StatusCode::NOT_ACCEPTABLE {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let payload: UserPayload = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;

        Ok(Some(payload.into_user()))
    }
}
