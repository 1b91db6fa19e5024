use std::time::{Duration, Instant};

use async_trait::async_trait;
use ppecheck_core::{AppError, AppResult};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Token endpoint of the GCE/Cloud Run metadata server.
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Source of OAuth2 bearer tokens for Google Cloud REST APIs.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a currently valid access token.
    async fn access_token(&self) -> AppResult<String>;
}

/// Token provider returning a fixed token.
#[derive(Clone)]
pub struct StaticAccessTokenProvider {
    token: String,
}

impl StaticAccessTokenProvider {
    /// Creates a provider for a pre-issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticAccessTokenProvider {
    async fn access_token(&self) -> AppResult<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Clone)]
struct CachedAccessToken {
    token: String,
    refresh_at: Instant,
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Token provider backed by the instance metadata server, with caching.
pub struct MetadataServerAccessTokenProvider {
    http_client: reqwest::Client,
    endpoint: String,
    cached: RwLock<Option<CachedAccessToken>>,
}

impl MetadataServerAccessTokenProvider {
    /// Creates a provider for the default metadata endpoint.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_endpoint(http_client, DEFAULT_METADATA_TOKEN_URL)
    }

    /// Creates a provider for a custom token endpoint.
    #[must_use]
    pub fn with_endpoint(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            cached: RwLock::new(None),
        }
    }

    async fn request_token(&self) -> AppResult<CachedAccessToken> {
        let response = self
            .http_client
            .get(self.endpoint.as_str())
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to call metadata token endpoint: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Unavailable(format!(
                "metadata token endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        let token = response
            .json::<MetadataTokenResponse>()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to parse metadata token response body: {error}"
                ))
            })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        debug!(
            expires_in = token.expires_in,
            "fetched access token from metadata server"
        );

        Ok(CachedAccessToken {
            token: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl AccessTokenProvider for MetadataServerAccessTokenProvider {
    async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached
                .as_ref()
                .filter(|entry| entry.refresh_at > Instant::now())
            {
                return Ok(entry.token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        if let Some(entry) = cached
            .as_ref()
            .filter(|entry| entry.refresh_at > Instant::now())
        {
            return Ok(entry.token.clone());
        }

        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);

        Ok(token)
    }
}
