//! Browser-driver capability interface.
//!
//! The crate does not ship a browser automation backend. Anything that can
//! navigate, wait, evaluate script against the live page, and expose captured
//! network traffic can back the script-probe and network-log strategies by
//! implementing [`BrowserDriver`].

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out waiting for {0}")]
    WaitTimeout(String),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("driver unavailable: {0}")]
    Unavailable(String),
}

/// Condition a driver can block on before we probe the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// DOM reached readyState "complete".
    DomReady,
    /// At least one element matches the CSS selector.
    ElementPresent(String),
}

impl std::fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomReady => write!(f, "dom-ready"),
            Self::ElementPresent(sel) => write!(f, "element `{}`", sel),
        }
    }
}

/// One captured response-received event from the driver's network log.
#[derive(Debug, Clone)]
pub struct NetworkEntry {
    pub url: String,
    pub status: Option<u16>,
}

/// Capability object over a live rendered page.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn wait_for(&self, condition: WaitCondition, timeout: Duration)
        -> Result<(), DriverError>;

    /// Evaluate `source` in page context. `Ok(None)` means the script ran and
    /// returned null/undefined.
    async fn run_script(&self, source: &str) -> Result<Option<Value>, DriverError>;

    /// Response-received events captured since navigation.
    async fn network_log(&self) -> Result<Vec<NetworkEntry>, DriverError>;
}

// ── Resource pool ─────────────────────────────────────────────────────────────

/// Fixed-size pool of shared collaborators (HTTP sessions, driver handles).
/// Checkout is round-robin over an atomic cursor; items are shared read-only,
/// so "return" is just dropping the Arc.
pub struct ResourcePool<T: ?Sized> {
    slots: Vec<Arc<T>>,
    cursor: AtomicUsize,
}

impl<T: ?Sized> ResourcePool<T> {
    pub fn new(slots: Vec<Arc<T>>) -> Self {
        Self { slots, cursor: AtomicUsize::new(0) }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Next pooled item, round-robin. `None` when the pool is empty — callers
    /// either degrade to a one-off resource or decline.
    pub fn checkout(&self) -> Option<Arc<T>> {
        if self.slots.is_empty() {
            return None;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        Some(Arc::clone(&self.slots[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_cycles_through_slots() {
        let pool = ResourcePool::new(vec![Arc::new(1u32), Arc::new(2), Arc::new(3)]);
        let picks: Vec<u32> = (0..6).map(|_| *pool.checkout().unwrap()).collect();
        assert_eq!(picks, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn empty_pool_returns_none() {
        let pool: ResourcePool<u32> = ResourcePool::empty();
        assert!(pool.checkout().is_none());
        assert!(pool.is_empty());
    }
}
