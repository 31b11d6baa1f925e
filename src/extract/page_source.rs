//! Static-HTML extraction: embedded JSON literals inside inline `<script>`
//! blocks.

use crate::config::ScraperConfig;
use crate::driver::ResourcePool;
use crate::extract::http_client::{HttpClient, HttpSource};
use crate::extract::shape::looks_like_price_series;
use crate::extract::{ExtractError, ExtractStrategy};
use crate::models::SeriesSource;
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Textual patterns scanned in order. Group 1 is the candidate substring.
static LITERAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)chartData\s*[:=]\s*(\{[^}]*\})",
        r"(?is)priceData\s*[:=]\s*(\[[^\]]*\])",
        r"(?is)historyData\s*[:=]\s*(\{[^}]*\})",
        r"(?is)labels\s*:\s*(\[[^\]]*\])",
        r"(?is)data\s*:\s*(\[[^\]]*\])",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Scan every inline script block for an embedded price-series literal.
/// First substring that both decodes as JSON and validates wins; decode
/// failures are swallowed and the scan continues.
pub fn extract_from_html(html: &str) -> Option<Value> {
    let doc = Html::parse_document(html);
    let script_sel = Selector::parse("script").ok()?;

    for script in doc.select(&script_sel) {
        let body: String = script.text().collect();
        if body.is_empty() {
            continue;
        }

        for pattern in LITERAL_PATTERNS.iter() {
            for captures in pattern.captures_iter(&body) {
                let Some(candidate) = captures.get(1) else { continue };
                let Ok(value) = serde_json::from_str::<Value>(candidate.as_str()) else {
                    continue;
                };
                if looks_like_price_series(&value) {
                    debug!("embedded literal matched pattern {}", pattern.as_str());
                    return Some(value);
                }
            }
        }
    }

    None
}

/// Fetches the page over a pooled HTTP session and runs [`extract_from_html`].
pub struct PageSourceStrategy {
    sessions: Arc<ResourcePool<dyn HttpSource>>,
    config: ScraperConfig,
}

impl PageSourceStrategy {
    pub fn new(
        sessions: Arc<ResourcePool<dyn HttpSource>>,
        config: ScraperConfig,
    ) -> Self {
        Self { sessions, config }
    }

    /// Pooled session, or a one-off when the pool is empty.
    fn session(&self) -> Result<Arc<dyn HttpSource>, ExtractError> {
        match self.sessions.checkout() {
            Some(s) => Ok(s),
            None => Ok(Arc::new(HttpClient::new(&self.config, 0)?)),
        }
    }
}

#[async_trait]
impl ExtractStrategy for PageSourceStrategy {
    fn name(&self) -> &'static str {
        "page-source"
    }

    fn source(&self) -> SeriesSource {
        SeriesSource::PageSource
    }

    async fn extract(&self, url: &str) -> Result<Value, ExtractError> {
        let html = self.session()?.get_text(url).await?;
        extract_from_html(&html).ok_or(ExtractError::NoData)
    }
}
