// Transport between the client session and the auth endpoints

use async_trait::async_trait;
use serde::Deserialize;

use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::client::error::ClientError;

/// Calls the session store makes against the server
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ClientError>;
    async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ClientError>;
    async fn me(&self, token: &str) -> Result<UserResponse, ClientError>;
}

/// Only the part of an error body the client displays
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Decode a success body, or turn a failure into `ClientError::Api`
    async fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        tracing::debug!("Auth call failed with {}: {}", status, message);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await?;
        Self::read(response, "Login failed").await
    }

    async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(data)
            .send()
            .await?;
        Self::read(response, "Registration failed").await
    }

    async fn me(&self, token: &str) -> Result<UserResponse, ClientError> {
        let response = self
            .http
            .get(self.url("/api/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read(response, "Failed to load user").await
    }
}
