//! Client for the hosted auth provider
//!
//! User accounts and sessions live with the external auth service; this
//! client forwards signup, lookup, deletion, and password sign-in to its
//! REST interface. No credentials are minted or verified locally.

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::env;
use thiserror::Error;
use tracing::info;

/// Errors returned by the auth provider client
#[derive(Error, Debug)]
pub enum AuthClientError {
    /// The provider rejected the supplied credentials
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The provider answered with a non-success status
    #[error("Auth provider returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// The request never completed
    #[error("Auth provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Auth provider configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the auth provider's REST interface
    pub base_url: String,
    /// Service-role key used for admin endpoints
    pub service_key: String,
}

impl AuthConfig {
    /// Create a new AuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_BASE_URL`: Base URL of the auth provider
    /// - `AUTH_SERVICE_KEY`: Service-role key for admin endpoints
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("AUTH_BASE_URL")
            .map_err(|_| anyhow::anyhow!("AUTH_BASE_URL environment variable not set"))?;

        let service_key = env::var("AUTH_SERVICE_KEY")
            .map_err(|_| anyhow::anyhow!("AUTH_SERVICE_KEY environment variable not set"))?;

        Ok(AuthConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }
}

/// HTTP client for the auth provider
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    config: AuthConfig,
}

impl AuthClient {
    /// Create a new auth provider client
    pub fn new(config: AuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a user at the auth provider (admin endpoint)
    ///
    /// The provider confirms the email immediately; profile creation is
    /// handled separately through the profiles endpoint.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Value, AuthClientError> {
        info!("Creating auth user for email: {}", email);

        let response = self
            .http
            .post(format!("{}/admin/users", self.config.base_url))
            .bearer_auth(&self.config.service_key)
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await?;

        Self::into_json(response).await
    }

    /// List all users at the auth provider (admin endpoint)
    pub async fn list_users(&self) -> Result<Value, AuthClientError> {
        let response = self
            .http
            .get(format!("{}/admin/users", self.config.base_url))
            .bearer_auth(&self.config.service_key)
            .send()
            .await?;

        Self::into_json(response).await
    }

    /// Delete a user at the auth provider (admin endpoint)
    pub async fn delete_user(&self, id: &str) -> Result<Value, AuthClientError> {
        info!("Deleting auth user: {}", id);

        let response = self
            .http
            .delete(format!("{}/admin/users/{}", self.config.base_url, id))
            .bearer_auth(&self.config.service_key)
            .send()
            .await?;

        Self::into_json(response).await
    }

    /// Sign a user in with email and password
    ///
    /// Returns the provider's session payload (user record plus access and
    /// refresh tokens) verbatim.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Value, AuthClientError> {
        let response = self
            .http
            .post(format!(
                "{}/token?grant_type=password",
                self.config.base_url
            ))
            .json(&json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(AuthClientError::InvalidCredentials);
        }

        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> Result<Value, AuthClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthClientError::Upstream { status, body });
        }

        Ok(response.json().await?)
    }
}
