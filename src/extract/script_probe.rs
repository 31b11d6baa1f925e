//! In-page script probe: reads chart-library state out of the live page.

use crate::config::BrowserConfig;
use crate::driver::{BrowserDriver, ResourcePool, WaitCondition};
use crate::extract::{ExtractError, ExtractStrategy};
use crate::models::SeriesSource;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Probe evaluated in page context. Three lookups, first hit wins:
/// Chart.js instance registry → chart object hung off a canvas → allow-listed
/// globals. Returns null when nothing is found.
const CHART_PROBE_JS: &str = r#"
var chartData = null;

// Chart.js instance registry
if (window.Chart && window.Chart.instances) {
    var instances = Object.values(window.Chart.instances);
    if (instances.length > 0) {
        var chart = instances[0];
        if (chart.data && chart.data.datasets && chart.data.datasets[0]) {
            chartData = {
                labels: chart.data.labels,
                data: chart.data.datasets[0].data
            };
        }
    }
}

// Chart object attached to a canvas element
if (!chartData) {
    var canvases = document.querySelectorAll('canvas');
    for (var i = 0; i < canvases.length; i++) {
        if (canvases[i].chart && canvases[i].chart.data) {
            chartData = {
                labels: canvases[i].chart.data.labels,
                data: canvases[i].chart.data.datasets[0].data
            };
            break;
        }
    }
}

// Likely global variable names
if (!chartData) {
    var possibleVars = ['chartData', 'priceData', 'historyData', 'priceHistoryData'];
    for (var j = 0; j < possibleVars.length; j++) {
        if (window[possibleVars[j]]) {
            chartData = window[possibleVars[j]];
            break;
        }
    }
}

return chartData;
"#;

/// Navigates a pooled driver to the URL, waits for the chart to render, then
/// runs [`CHART_PROBE_JS`] and hands back whatever it returned.
pub struct ScriptProbeStrategy {
    drivers: Arc<ResourcePool<dyn BrowserDriver>>,
    config: BrowserConfig,
}

impl ScriptProbeStrategy {
    pub fn new(drivers: Arc<ResourcePool<dyn BrowserDriver>>, config: BrowserConfig) -> Self {
        Self { drivers, config }
    }
}

#[async_trait]
impl ExtractStrategy for ScriptProbeStrategy {
    fn name(&self) -> &'static str {
        "script-probe"
    }

    fn source(&self) -> SeriesSource {
        SeriesSource::Script
    }

    async fn extract(&self, url: &str) -> Result<Value, ExtractError> {
        // No way to conjure an ad hoc browser; decline and let the cascade
        // fall through to the HTTP-only strategies.
        let driver = self.drivers.checkout().ok_or(ExtractError::ResourceUnavailable)?;

        driver.navigate(url).await?;
        driver
            .wait_for(
                WaitCondition::ElementPresent(self.config.wait_selector.clone()),
                Duration::from_secs(self.config.wait_timeout_secs),
            )
            .await?;

        // Charts render asynchronously after the canvas appears.
        sleep(Duration::from_millis(self.config.settle_ms)).await;

        match driver.run_script(CHART_PROBE_JS).await? {
            Some(value) if !value.is_null() => {
                debug!("probe returned a candidate for {}", url);
                Ok(value)
            }
            _ => Err(ExtractError::NoData),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverError, NetworkEntry};
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeDriver {
        script_result: Option<Value>,
        wait_fails: bool,
        visited: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BrowserDriver for FakeDriver {
        async fn navigate(&self, url: &str) -> Result<(), DriverError> {
            self.visited.lock().unwrap().push(url.to_string());
            Ok(())
        }

        async fn wait_for(
            &self,
            condition: WaitCondition,
            _timeout: Duration,
        ) -> Result<(), DriverError> {
            if self.wait_fails {
                Err(DriverError::WaitTimeout(condition.to_string()))
            } else {
                Ok(())
            }
        }

        async fn run_script(&self, _source: &str) -> Result<Option<Value>, DriverError> {
            Ok(self.script_result.clone())
        }

        async fn network_log(&self) -> Result<Vec<NetworkEntry>, DriverError> {
            Ok(vec![])
        }
    }

    fn pool(driver: Arc<FakeDriver>) -> Arc<ResourcePool<dyn BrowserDriver>> {
        Arc::new(ResourcePool::new(vec![driver]))
    }

    fn fast_config() -> BrowserConfig {
        BrowserConfig { settle_ms: 0, ..BrowserConfig::default() }
    }

    #[tokio::test]
    async fn returns_probe_result_after_navigating() {
        let candidate = json!({"labels": ["d1"], "data": [9]});
        let driver = Arc::new(FakeDriver {
            script_result: Some(candidate.clone()),
            wait_fails: false,
            visited: Mutex::new(vec![]),
        });
        let strategy = ScriptProbeStrategy::new(pool(Arc::clone(&driver)), fast_config());
        assert_eq!(strategy.extract("http://x/p").await.unwrap(), candidate);
        assert_eq!(*driver.visited.lock().unwrap(), vec!["http://x/p".to_string()]);
    }

    #[tokio::test]
    async fn null_probe_result_declines() {
        let driver = Arc::new(FakeDriver {
            script_result: None,
            wait_fails: false,
            visited: Mutex::new(vec![]),
        });
        let strategy = ScriptProbeStrategy::new(pool(driver), fast_config());
        assert!(matches!(
            strategy.extract("http://x/p").await,
            Err(ExtractError::NoData)
        ));
    }

    #[tokio::test]
    async fn wait_timeout_is_a_decline_not_a_panic() {
        let driver = Arc::new(FakeDriver {
            script_result: Some(json!({"labels": [], "data": []})),
            wait_fails: true,
            visited: Mutex::new(vec![]),
        });
        let strategy = ScriptProbeStrategy::new(pool(driver), fast_config());
        assert!(matches!(
            strategy.extract("http://x/p").await,
            Err(ExtractError::Driver(DriverError::WaitTimeout(_)))
        ));
    }

    #[tokio::test]
    async fn empty_driver_pool_declines() {
        let strategy = ScriptProbeStrategy::new(
            Arc::new(ResourcePool::empty()),
            fast_config(),
        );
        assert!(matches!(
            strategy.extract("http://x/p").await,
            Err(ExtractError::ResourceUnavailable)
        ));
    }
}
