//! Network-traffic extraction: replay captured API responses that look like
//! price endpoints.

use crate::config::ScraperConfig;
use crate::driver::{BrowserDriver, NetworkEntry, ResourcePool};
use crate::extract::http_client::{HttpClient, HttpSource};
use crate::extract::shape::looks_like_price_series;
use crate::extract::{ExtractError, ExtractStrategy};
use crate::models::SeriesSource;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A logged response URL is worth fetching when it contains one of these.
const URL_KEYWORDS: [&str; 5] = ["price", "history", "chart", "data", "api"];

pub fn is_candidate_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    URL_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Logged responses worth re-fetching: keyword-matching URL, and not a
/// recorded client/server error.
fn is_candidate_entry(entry: &NetworkEntry) -> bool {
    is_candidate_url(&entry.url) && entry.status.is_none_or(|s| (200..300).contains(&s))
}

/// Reads the driver's captured response log after navigation and re-fetches
/// keyword-matching URLs until one yields a validated payload. Per-candidate
/// failures (network or decode) are skipped, never propagated.
pub struct NetworkLogStrategy {
    drivers: Arc<ResourcePool<dyn BrowserDriver>>,
    sessions: Arc<ResourcePool<dyn HttpSource>>,
    config: ScraperConfig,
}

impl NetworkLogStrategy {
    pub fn new(
        drivers: Arc<ResourcePool<dyn BrowserDriver>>,
        sessions: Arc<ResourcePool<dyn HttpSource>>,
        config: ScraperConfig,
    ) -> Self {
        Self { drivers, sessions, config }
    }

    fn session(&self) -> Result<Arc<dyn HttpSource>, ExtractError> {
        match self.sessions.checkout() {
            Some(s) => Ok(s),
            None => Ok(Arc::new(HttpClient::new(&self.config, 0)?)),
        }
    }
}

#[async_trait]
impl ExtractStrategy for NetworkLogStrategy {
    fn name(&self) -> &'static str {
        "network-log"
    }

    fn source(&self) -> SeriesSource {
        SeriesSource::NetworkLog
    }

    async fn extract(&self, url: &str) -> Result<Value, ExtractError> {
        let driver = self.drivers.checkout().ok_or(ExtractError::ResourceUnavailable)?;

        // Make sure the log belongs to this product page; navigating twice is
        // harmless, the earlier script probe usually already did it.
        driver.navigate(url).await?;
        let entries = driver.network_log().await?;

        let candidates: Vec<NetworkEntry> =
            entries.into_iter().filter(is_candidate_entry).collect();
        debug!("{} candidate responses in network log", candidates.len());

        let session = self.session()?;
        for entry in &candidates {
            match session.get_json(&entry.url).await {
                Ok(body) if looks_like_price_series(&body) => return Ok(body),
                Ok(_) => debug!("{}: body did not validate", entry.url),
                Err(e) => debug!("{}: fetch failed: {}", entry.url, e),
            }
        }

        Err(ExtractError::NoData)
    }
}
