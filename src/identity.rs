//! Client for the hosted identity service.
//!
//! Sign-up, sign-in and sign-out are delegated to a GoTrue-compatible HTTP API.
//! The service issues the session tokens that [`crate::auth`] verifies locally.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("identity provider rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("identity provider unavailable (status {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity provider is not configured")]
    NotConfigured,
}

/// Authenticated identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session issued after a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Result of a sign-up: either an immediate session or a pending email confirmation.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    Session(AuthSession),
    ConfirmationRequired(AuthUser),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// GoTrue HTTP client.
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoTrueClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("juz-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .post(format!("{}/auth/v1/{}", self.base_url, path))
            .header("Accept", "application/json");
        match &self.api_key {
            Some(key) => builder.header("apikey", key),
            None => builder,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let response = self
            .request("signup")
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return match response.json::<SignUpResponse>().await? {
                SignUpResponse::Session(session) => {
                    tracing::info!(user_id = %session.user.id, "User signed up");
                    Ok(SignUpOutcome::Session(session))
                }
                SignUpResponse::User(user) => {
                    tracing::info!(user_id = %user.id, "User signed up, confirmation pending");
                    Ok(SignUpOutcome::ConfirmationRequired(user))
                }
            };
        }

        let message = error_message(response).await;
        if status.is_server_error() {
            Err(AuthError::Unavailable {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .request("token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let session: AuthSession = response.json().await?;
            tracing::info!(user_id = %session.user.id, "User signed in");
            return Ok(session);
        }

        let message = error_message(response).await;
        if status.is_server_error() {
            Err(AuthError::Unavailable {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(AuthError::InvalidCredentials(message))
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .request("logout")
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        // An already revoked session is as good as signed out.
        if status.is_success() || status.as_u16() == 401 || status.as_u16() == 404 {
            return Ok(());
        }

        Err(AuthError::Unavailable {
            status: status.as_u16(),
            message: error_message(response).await,
        })
    }
}

/// Provider used when no identity service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn sign_up(&self, _: &str, _: &str, _: &str) -> Result<SignUpOutcome, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_in(&self, _: &str, _: &str) -> Result<AuthSession, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_out(&self, _: &str) -> Result<(), AuthError> {
        Err(AuthError::NotConfigured)
    }
}

/// Builds the identity provider described by the configuration.
pub fn identity_provider_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn IdentityProvider>, AuthError> {
    match &config.auth_base_url {
        Some(base_url) => Ok(Arc::new(GoTrueClient::new(
            base_url.clone(),
            config.auth_api_key.clone(),
        )?)),
        None => {
            tracing::warn!("No identity provider configured; sign-up and sign-in are disabled");
            Ok(Arc::new(DisabledIdentityProvider))
        }
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    extract_error_message(&body).unwrap_or_else(|| format!("request failed with status {status}"))
}

/// Pulls a human readable message out of the provider's error body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
