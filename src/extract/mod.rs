pub mod http_client;
pub mod network_log;
pub mod normalize;
pub mod page_source;
pub mod product_info;
pub mod script_probe;
pub mod shape;
pub mod synthetic;

use crate::driver::DriverError;
use crate::models::SeriesSource;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// ── Error taxonomy ────────────────────────────────────────────────────────────

/// Failures inside a single extraction attempt. Nothing here is fatal to the
/// pipeline: every variant makes the current strategy decline and the cascade
/// move on.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no price data found")]
    NoData,

    #[error("candidate did not match any known price shape")]
    MalformedCandidate,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network: {0}")]
    Network(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("no pooled resource available")]
    ResourceUnavailable,

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl ExtractError {
    /// Worth another attempt on the same request? Connect errors, timeouts and
    /// server-side throttling are; other HTTP statuses are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Status(code) => matches!(code, 429 | 503),
            _ => false,
        }
    }
}

// ── Strategy trait ────────────────────────────────────────────────────────────

/// One method in the fallback cascade. Returns a raw, unvalidated candidate;
/// the pipeline validates, normalizes and decides whether to stop.
#[async_trait]
pub trait ExtractStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn source(&self) -> SeriesSource;

    async fn extract(&self, url: &str) -> Result<Value, ExtractError>;
}
