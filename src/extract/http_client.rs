//! HTTP capability used by the page-source and network-log extractors.
//!
//! Every request pays an advisory pacing delay (configured base + random
//! jitter) before going out, then retries with exponential backoff on
//! retryable failures only. This is politeness toward the target site, not a
//! correctness mechanism.

use crate::config::ScraperConfig;
use crate::extract::ExtractError;
use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::debug;

/// Read-only HTTP capability. Split out as a trait so extractors can be
/// exercised against canned responses.
#[async_trait]
pub trait HttpSource: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, ExtractError>;

    async fn get_json(&self, url: &str) -> Result<Value, ExtractError>;
}

pub struct HttpClient {
    inner: reqwest::Client,
    config: ScraperConfig,
}

impl HttpClient {
    /// Build a session. `agent_index` picks the user agent from the configured
    /// list so a pool of sessions presents varied agents.
    pub fn new(config: &ScraperConfig, agent_index: usize) -> Result<Self, ExtractError> {
        let agent = config
            .user_agents
            .get(agent_index % config.user_agents.len().max(1))
            .map(String::as_str)
            .unwrap_or("pricebefore-etl/0.1");

        let inner = reqwest::Client::builder()
            .user_agent(agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        Ok(Self { inner, config: config.clone() })
    }

    async fn fetch_once(&self, url: &str) -> Result<reqwest::Response, ExtractError> {
        debug!("GET {}", url);
        let resp = self.inner.get(url).send().await.map_err(classify_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status.as_u16()));
        }
        Ok(resp)
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response, ExtractError> {
        self.polite_delay().await;

        let backoff = ExponentialBackoff::from_millis(self.config.retry_base_ms)
            .map(jitter)
            .take(self.config.max_retries as usize);

        RetryIf::spawn(backoff, || self.fetch_once(url), ExtractError::is_retryable).await
    }

    /// Sleep for the configured delay + random jitter.
    async fn polite_delay(&self) {
        let jitter_ms = rand::rng().random_range(0..=self.config.jitter_ms);
        sleep(Duration::from_millis(self.config.request_delay_ms + jitter_ms)).await;
    }
}

#[async_trait]
impl HttpSource for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, ExtractError> {
        self.fetch(url)
            .await?
            .text()
            .await
            .map_err(|e| ExtractError::Network(e.to_string()))
    }

    async fn get_json(&self, url: &str) -> Result<Value, ExtractError> {
        self.fetch(url)
            .await?
            .json()
            .await
            .map_err(|_| ExtractError::MalformedCandidate)
    }
}

fn classify_reqwest(e: reqwest::Error) -> ExtractError {
    if e.is_timeout() {
        ExtractError::Timeout(e.to_string())
    } else {
        ExtractError::Network(e.to_string())
    }
}
