// SPDX-License-Identifier: AGPL-3.0
// Course Finder Core - Auth service client
//
// One POST per login attempt, no retries.

use crate::types::{AppError, User};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoint used when no configuration overrides it
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://dummyjson.com/auth/login";

/// Message shown when the service gives no reason
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

/// Remote authentication
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<User, AppError>;
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// reqwest-backed client for the login endpoint
#[derive(Clone)]
pub struct HttpAuthApi {
    client: Client,
    endpoint: String,
}

impl HttpAuthApi {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        tracing::info!("Logging in {} via {}", username, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Login request failed: {}", e);
                AppError::Auth(LOGIN_FAILED_MESSAGE.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string());
            tracing::warn!("Login rejected ({}): {}", status, message);
            return Err(AppError::Auth(message));
        }

        let user: User = response.json().await.map_err(|e| {
            tracing::error!("Unexpected login response: {}", e);
            AppError::Auth(LOGIN_FAILED_MESSAGE.to_string())
        })?;
        Ok(user)
    }
}

/// Check the login form before any request is made
pub fn validate_credentials(username: &str, password: &str) -> Result<(), AppError> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }
    Ok(())
}
