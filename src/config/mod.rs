use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub browser: BrowserConfig,
    pub pipeline: PipelineConfig,
    pub synthetic: SyntheticConfig,
    pub output: OutputConfig,
}

/// HTTP scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

/// Headless-browser probe configuration. The driver itself is supplied by the
/// caller; these only shape how long we wait for charts to render.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default = "default_wait_selector")]
    pub wait_selector: String,

    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

/// Pipeline configuration: worker-pool width and which extraction strategies
/// are wired in. Order is fixed (script → page source → network log); these
/// flags only pick the subset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_http_sessions")]
    pub http_sessions: usize,

    #[serde(default = "default_true")]
    pub use_script_probe: bool,

    #[serde(default = "default_true")]
    pub use_page_source: bool,

    #[serde(default = "default_true")]
    pub use_network_log: bool,

    #[serde(default = "default_true")]
    pub synthetic_fallback: bool,
}

/// Synthetic fallback series parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyntheticConfig {
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,

    #[serde(default = "default_base_price_min")]
    pub base_price_min: u32,

    #[serde(default = "default_base_price_max")]
    pub base_price_max: u32,

    #[serde(default = "default_floor_price")]
    pub floor_price: u32,

    #[serde(default = "default_true")]
    pub weekly_spacing: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://www.pricebefore.com".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_request_delay_ms() -> u64 {
    1500
}
fn default_jitter_ms() -> u64 {
    500
}
fn default_retry_base_ms() -> u64 {
    200
}
fn default_max_retries() -> u32 {
    3
}
fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_wait_selector() -> String {
    "canvas".to_string()
}
fn default_wait_timeout_secs() -> u64 {
    20
}
fn default_settle_ms() -> u64 {
    3000
}
fn default_concurrency() -> usize {
    3
}
fn default_http_sessions() -> usize {
    3
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 11, 1).unwrap()
}
fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()
}
fn default_base_price_min() -> u32 {
    2000
}
fn default_base_price_max() -> u32 {
    50000
}
fn default_floor_price() -> u32 {
    100
}
fn default_output_path() -> PathBuf {
    PathBuf::from("data/price-history.csv")
}
fn default_true() -> bool {
    true
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("PRICEBEFORE").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            browser: BrowserConfig::default(),
            pipeline: PipelineConfig::default(),
            synthetic: SyntheticConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            jitter_ms: default_jitter_ms(),
            retry_base_ms: default_retry_base_ms(),
            max_retries: default_max_retries(),
            user_agents: default_user_agents(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            wait_selector: default_wait_selector(),
            wait_timeout_secs: default_wait_timeout_secs(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            http_sessions: default_http_sessions(),
            use_script_probe: true,
            use_page_source: true,
            use_network_log: true,
            synthetic_fallback: true,
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            base_price_min: default_base_price_min(),
            base_price_max: default_base_price_max(),
            floor_price: default_floor_price(),
            weekly_spacing: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { path: default_output_path() }
    }
}
