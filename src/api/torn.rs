//! API client for the Torn public REST API.
//!
//! All requests are key-authenticated via a query parameter. Torn mixes
//! two API generations: basic user/faction selections live under v1,
//! chain data under v2. Failures come back as HTTP 200 with an embedded
//! `error` object, so every body is screened before deserializing.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{ChainResponse, Faction, FactionChain, User};

use super::error::ErrorEnvelope;
use super::ApiError;

/// Base URL for v1 endpoints
const API_BASE_URL: &str = "https://api.torn.com";

/// Base URL for v2 endpoints (chain data)
const API_V2_BASE_URL: &str = "https://api.torn.com/v2";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for Torn.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct TornClient {
    client: Client,
    key: String,
}

impl TornClient {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, key: key.into() })
    }

    /// GET a Torn endpoint, screening the body for an embedded error
    /// object before deserializing the expected type.
    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("key", self.key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            debug!(url, code = envelope.error.code, "Torn returned an error body");
            return Err(ApiError::from_envelope(envelope.error).into());
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Fetch the user's own profile and cooldowns
    pub async fn fetch_user(&self) -> Result<User> {
        let url = format!("{}/user/", API_BASE_URL);
        self.get(&url, &[("selections", "profile,cooldowns")]).await
    }

    /// Fetch the user's own faction (basic data plus ranked wars)
    pub async fn fetch_own_faction(&self) -> Result<Faction> {
        let url = format!("{}/faction/", API_BASE_URL);
        self.get(&url, &[("selections", "basic")]).await
    }

    /// Fetch another faction's basic data, including its member roster
    pub async fn fetch_faction(&self, faction_id: i64) -> Result<Faction> {
        let url = format!("{}/faction/{}", API_BASE_URL, faction_id);
        self.get(&url, &[("selections", "basic")]).await
    }

    /// Fetch the user's own faction chain
    pub async fn fetch_own_chain(&self) -> Result<FactionChain> {
        let url = format!("{}/faction/chain", API_V2_BASE_URL);
        let response: ChainResponse = self.get(&url, &[]).await?;
        Ok(response.chain)
    }

    /// Fetch another faction's chain
    pub async fn fetch_chain(&self, faction_id: i64) -> Result<FactionChain> {
        let url = format!("{}/faction/{}/chain", API_V2_BASE_URL, faction_id);
        let response: ChainResponse = self.get(&url, &[]).await?;
        Ok(response.chain)
    }

    /// Check whether the key is accepted by the API. Uses the chain
    /// endpoint, which any limited-access key can read.
    pub async fn validate_key(&self) -> bool {
        match self.fetch_own_chain().await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Torn key validation failed");
                // A network failure still means the key is unusable
                // right now, so it counts as invalid.
                false
            }
        }
    }
}
