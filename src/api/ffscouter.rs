//! API client for the FFScouter stat-estimation service.
//!
//! FFScouter takes a comma-joined list of player ids and returns one
//! estimate record per target. Like Torn, errors arrive as a 200 with
//! an `error` object in the body.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::models::FfScouterData;

use super::error::ErrorEnvelope;
use super::ApiError;

const API_BASE_URL: &str = "https://ffscouter.com/api/v1";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct FfScouterClient {
    client: Client,
    key: String,
}

impl FfScouterClient {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, key: key.into() })
    }

    /// Fetch stat estimates for a batch of player ids.
    pub async fn fetch_stats(&self, targets: &[i64]) -> Result<Vec<FfScouterData>> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let joined = targets
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!("{}/get-stats", API_BASE_URL);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.key.as_str()), ("targets", joined.as_str())])
            .send()
            .await
            .context("Failed to send FFScouter request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        let body = response
            .text()
            .await
            .context("Failed to read FFScouter response body")?;

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            debug!(code = envelope.error.code, "FFScouter returned an error body");
            return Err(ApiError::from_envelope(envelope.error).into());
        }

        serde_json::from_str(&body).context("Failed to parse FFScouter response")
    }

    /// Check whether the key is accepted, using a single dummy target.
    pub async fn validate_key(&self) -> bool {
        match self.fetch_stats(&[1]).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "FFScouter key validation failed");
                false
            }
        }
    }
}
