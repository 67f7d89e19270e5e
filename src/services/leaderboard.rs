// src/services/leaderboard.rs

//! Leaderboard fetcher.
//!
//! Downloads the private leaderboard JSON using the account's session cookie.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::COOKIE;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::utils::{http, json_endpoint};

use super::LeaderboardSource;

/// HTTP client for a single private leaderboard.
#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    client: Client,
    url: Url,
    session_id: String,
}

impl LeaderboardClient {
    /// Create a client for `leaderboard_url`, authenticated by `session_id`.
    pub fn new(client: Client, leaderboard_url: &str, session_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client,
            url: json_endpoint(leaderboard_url)?,
            session_id: session_id.into(),
        })
    }

    /// Build a client and its HTTP transport from configuration.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let url = config
            .leaderboard_url
            .as_deref()
            .ok_or_else(|| AppError::config("source.leaderboard_url is not set"))?;
        Self::new(
            http::create_async_client(config)?,
            url,
            config.session_id.clone(),
        )
    }

    /// Endpoint that is polled.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl LeaderboardSource for LeaderboardClient {
    async fn fetch(&self) -> Result<serde_json::Value> {
        log::debug!("Fetching leaderboard from {}", self.url);

        let response = self
            .client
            .get(self.url.clone())
            .header(COOKIE, format!("session={}", self.session_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("leaderboard body is not JSON: {e}")))
    }
}
