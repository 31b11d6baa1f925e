//! Pipeline orchestrator: per-URL extraction cascade + bounded worker pool.
//!
//! Each URL walks a fixed-order strategy list (script probe → page source →
//! network log). The first candidate that validates and normalizes to a
//! non-empty series wins; any strategy error counts as a decline and the
//! cascade advances. When every strategy declines, synthetic generation is the
//! forced terminal success — unless disabled, in which case the URL yields no
//! record. Nothing per-URL is ever fatal to the run.

use crate::config::AppConfig;
use crate::driver::{BrowserDriver, ResourcePool};
use crate::extract::http_client::{HttpClient, HttpSource};
use crate::extract::network_log::NetworkLogStrategy;
use crate::extract::page_source::PageSourceStrategy;
use crate::extract::product_info::{ProductInfo, extract_product_info};
use crate::extract::script_probe::ScriptProbeStrategy;
use crate::extract::synthetic;
use crate::extract::{ExtractError, ExtractStrategy, normalize::normalize};
use crate::models::{ProductRecord, SeriesSource};
use crate::storage::CsvSink;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Where a single URL's run currently stands. Mostly diagnostic: the terminal
/// transitions decide whether a record is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    NotStarted,
    TryingStrategy(usize),
    Succeeded,
    ExhaustedFallback,
}

pub struct Pipeline {
    config: AppConfig,
    sessions: Arc<ResourcePool<dyn HttpSource>>,
    strategies: Vec<Arc<dyn ExtractStrategy>>,
}

impl Pipeline {
    /// HTTP-only deployment: no browser driver, so only the page-source
    /// strategy (plus synthetic fallback) is wired.
    pub fn new(config: AppConfig) -> Result<Self, ExtractError> {
        let sessions = build_session_pool(&config)?;

        let mut strategies: Vec<Arc<dyn ExtractStrategy>> = Vec::new();
        if config.pipeline.use_page_source {
            strategies.push(Arc::new(PageSourceStrategy::new(
                Arc::clone(&sessions),
                config.scraper.clone(),
            )));
        }

        Ok(Self { config, sessions, strategies })
    }

    /// Full cascade over a caller-supplied driver pool. Strategy order is
    /// fixed; config flags pick the subset.
    pub fn with_driver_pool(
        config: AppConfig,
        drivers: Arc<ResourcePool<dyn BrowserDriver>>,
    ) -> Result<Self, ExtractError> {
        let sessions = build_session_pool(&config)?;

        let mut strategies: Vec<Arc<dyn ExtractStrategy>> = Vec::new();
        if config.pipeline.use_script_probe {
            strategies.push(Arc::new(ScriptProbeStrategy::new(
                Arc::clone(&drivers),
                config.browser.clone(),
            )));
        }
        if config.pipeline.use_page_source {
            strategies.push(Arc::new(PageSourceStrategy::new(
                Arc::clone(&sessions),
                config.scraper.clone(),
            )));
        }
        if config.pipeline.use_network_log {
            strategies.push(Arc::new(NetworkLogStrategy::new(
                drivers,
                Arc::clone(&sessions),
                config.scraper.clone(),
            )));
        }

        Ok(Self { config, sessions, strategies })
    }

    /// Bespoke cascade. The strategy list replaces the built-in wiring but
    /// keeps the same transition rules.
    pub fn with_strategies(
        config: AppConfig,
        sessions: Arc<ResourcePool<dyn HttpSource>>,
        strategies: Vec<Arc<dyn ExtractStrategy>>,
    ) -> Self {
        Self { config, sessions, strategies }
    }

    /// Pooled session, or an ad hoc one-off when the pool is empty.
    fn session(&self) -> Result<Arc<dyn HttpSource>, ExtractError> {
        match self.sessions.checkout() {
            Some(s) => Ok(s),
            None => Ok(Arc::new(HttpClient::new(&self.config.scraper, 0)?)),
        }
    }

    /// Title/brand lookup is independent of price extraction; any failure
    /// degrades to placeholder defaults.
    async fn product_info(&self, url: &str) -> ProductInfo {
        let session = match self.session() {
            Ok(s) => s,
            Err(_) => return ProductInfo::default(),
        };
        match session.get_text(url).await {
            Ok(html) => extract_product_info(&html),
            Err(e) => {
                debug!("{}: product info fetch failed: {}", url, e);
                ProductInfo::default()
            }
        }
    }

    /// Run the cascade for one URL.
    pub async fn run_url(&self, url: &str) -> Result<ProductRecord, ExtractError> {
        let mut state = RunState::NotStarted;
        debug!(?state, url, "starting extraction");

        let info = self.product_info(url).await;

        for (i, strategy) in self.strategies.iter().enumerate() {
            state = RunState::TryingStrategy(i);
            debug!(?state, strategy = strategy.name(), url);

            match strategy.extract(url).await {
                Ok(candidate) => {
                    let series = normalize(&candidate);
                    if series.is_empty() {
                        debug!("{}: {} candidate normalized to empty", url, strategy.name());
                        continue;
                    }
                    state = RunState::Succeeded;
                    info!(
                        "{}: {} points via {} ({:?})",
                        url,
                        series.len(),
                        strategy.name(),
                        state
                    );
                    return Ok(ProductRecord {
                        title: info.title,
                        brand: info.brand,
                        series,
                        source: strategy.source(),
                        scraped_at: Utc::now().naive_utc(),
                    });
                }
                Err(e) => {
                    debug!("{}: {} declined: {}", url, strategy.name(), e);
                }
            }
        }

        state = RunState::ExhaustedFallback;
        if !self.config.pipeline.synthetic_fallback {
            warn!(?state, url, "no data extracted and synthetic fallback disabled");
            return Err(ExtractError::NoData);
        }

        warn!(?state, url, "all strategies declined, generating synthetic series");
        Ok(ProductRecord {
            title: info.title,
            brand: info.brand,
            series: synthetic::generate(&self.config.synthetic, None),
            source: SeriesSource::Synthetic,
            scraped_at: Utc::now().naive_utc(),
        })
    }

    /// Scrape every URL with bounded concurrency, appending records to the
    /// sink as they complete. Completion order is not guaranteed.
    pub async fn run(self: Arc<Self>, urls: Vec<String>, sink: Arc<CsvSink>) -> PipelineStats {
        info!("=== Scraping {} product pages ===", urls.len());

        let sem = Arc::new(Semaphore::new(self.config.pipeline.concurrency.max(1)));
        let mut handles = Vec::new();

        for url in urls {
            let pipeline = Arc::clone(&self);
            let sink = Arc::clone(&sink);
            let sem = Arc::clone(&sem);

            let handle = tokio::spawn(async move {
                let _permit = sem.acquire().await?;

                let record = pipeline.run_url(&url).await
                    .map_err(|e| anyhow::anyhow!("{}: {}", url, e))?;

                let rows = sink.append_record(&record)
                    .with_context(|| format!("append rows for {}", url))?;

                info!(
                    "{}: {} rows [{}] {}",
                    url,
                    rows,
                    record.source.as_str(),
                    crate::utils::ellipsize(&record.title, 50)
                );

                Ok::<(usize, SeriesSource), anyhow::Error>((rows, record.source))
            });

            handles.push(handle);
        }

        let mut stats = PipelineStats::default();
        for handle in handles {
            match handle.await {
                Ok(Ok((rows, source))) => {
                    stats.products_processed += 1;
                    stats.rows_written += rows;
                    if source == SeriesSource::Synthetic {
                        stats.synthetic_series += 1;
                    }
                }
                Ok(Err(e)) => {
                    warn!("{:#}", e);
                    stats.errors += 1;
                }
                Err(e) => {
                    error!("task panic: {}", e);
                    stats.errors += 1;
                }
            }
        }

        info!(
            "=== Done: {} products | {} rows | {} synthetic | {} errors ===",
            stats.products_processed, stats.rows_written, stats.synthetic_series, stats.errors
        );
        stats
    }
}

fn build_session_pool(config: &AppConfig) -> Result<Arc<ResourcePool<dyn HttpSource>>, ExtractError> {
    let mut slots: Vec<Arc<dyn HttpSource>> = Vec::new();
    for i in 0..config.pipeline.http_sessions {
        slots.push(Arc::new(HttpClient::new(&config.scraper, i)?));
    }
    Ok(Arc::new(ResourcePool::new(slots)))
}

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub products_processed: usize,
    pub rows_written: usize,
    pub synthetic_series: usize,
    pub errors: usize,
}
