//! Profile endpoints.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{RequestError, RequestResult};
use crate::models::{Profile, ProfileEnvelope, ProfileUpdate};

/// Operations on the signed-in user's profile.
///
/// `token` is the session token; when `None` the request is sent without an
/// `Authorization` header and the server is expected to reject it.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// `GET /profile`.
    async fn fetch_profile(&self, token: Option<&str>) -> RequestResult<Profile>;

    /// `PUT /profile`.
    async fn update_profile(&self, token: Option<&str>, update: &ProfileUpdate) -> RequestResult<()>;

    /// `DELETE /profile`.
    async fn delete_profile(&self, token: Option<&str>) -> RequestResult<()>;
}

/// HTTP client for the profile API.
#[derive(Clone)]
pub struct ProfileClient {
    client: reqwest::Client,
    api_url: String,
}

impl ProfileClient {
    /// Create a new profile client.
    pub fn new(api_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_url, config.request_timeout)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn profile_url(&self) -> String {
        format!("{}/profile", self.api_url)
    }

    /// Send `request`, returning the response only if it succeeded.
    async fn send(request: RequestBuilder, token: Option<&str>) -> RequestResult<Response> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::from_status(status, body));
        }

        Ok(response)
    }
}

#[async_trait]
impl ProfileApi for ProfileClient {
    async fn fetch_profile(&self, token: Option<&str>) -> RequestResult<Profile> {
        let response = Self::send(self.client.get(self.profile_url()), token).await?;

        let body = response.text().await?;
        let envelope: ProfileEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.user)
    }

    async fn update_profile(&self, token: Option<&str>, update: &ProfileUpdate) -> RequestResult<()> {
        let response = Self::send(self.client.put(self.profile_url()).json(update), token).await?;

        if response.status() != StatusCode::OK {
            tracing::debug!(status = %response.status(), "Profile update accepted with unexpected status");
        }

        Ok(())
    }

    async fn delete_profile(&self, token: Option<&str>) -> RequestResult<()> {
        let response = Self::send(self.client.delete(self.profile_url()), token).await?;

        if response.status() != StatusCode::NO_CONTENT {
            tracing::debug!(status = %response.status(), "Profile deletion accepted with unexpected status");
        }

        Ok(())
    }
}
