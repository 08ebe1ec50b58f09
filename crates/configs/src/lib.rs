use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { worker_threads: Some(4), json_logs: false }
    }
}

/// Fan-out and pagination knobs for the aggregation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_source_timeout_ms")]
    pub source_timeout_ms: u64,
    #[serde(default = "default_per_listing_limit")]
    pub per_listing_limit: u32,
    #[serde(default = "default_exhaust_listings")]
    pub exhaust_listings: bool,
    #[serde(default = "default_max_pages_per_listing")]
    pub max_pages_per_listing: u32,
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u32,
    #[serde(default = "default_page_limit")]
    pub default_page_limit: u32,
}

fn default_max_concurrency() -> usize { 8 }
fn default_source_timeout_ms() -> u64 { 5_000 }
fn default_per_listing_limit() -> u32 { 100 }
fn default_exhaust_listings() -> bool { true }
fn default_max_pages_per_listing() -> u32 { 20 }
fn default_max_page_limit() -> u32 { 100 }
fn default_page_limit() -> u32 { 10 }

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            source_timeout_ms: default_source_timeout_ms(),
            per_listing_limit: default_per_listing_limit(),
            exhaust_listings: default_exhaust_listings(),
            max_pages_per_listing: default_max_pages_per_listing(),
            max_page_limit: default_max_page_limit(),
            default_page_limit: default_page_limit(),
        }
    }
}

/// Where the listing directory and review source live.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 { 10 }

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: String::new(), api_token: None, request_timeout_secs: default_request_timeout() }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Defaults plus environment, for runs without a config file.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 线程数为 0 时回退到默认值
        if self.runtime.worker_threads == Some(0) {
            self.runtime.worker_threads = Some(4);
        }
        self.aggregation.normalize()?;
        // 若 TOML 中未提供 base_url / token，则尝试从环境变量填充
        self.upstream.normalize_from_env();
        self.upstream.validate()?;
        Ok(())
    }
}

impl AggregationConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.max_concurrency == 0 {
            self.max_concurrency = default_max_concurrency();
        }
        if self.source_timeout_ms == 0 {
            self.source_timeout_ms = default_source_timeout_ms();
        }
        if self.max_pages_per_listing == 0 {
            self.max_pages_per_listing = 1;
        }
        if self.per_listing_limit == 0 {
            return Err(anyhow!("aggregation.per_listing_limit must be >= 1"));
        }
        if self.max_page_limit == 0 {
            return Err(anyhow!("aggregation.max_page_limit must be >= 1"));
        }
        self.default_page_limit = self.default_page_limit.clamp(1, self.max_page_limit);
        Ok(())
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }
}

impl UpstreamConfig {
    pub fn normalize_from_env(&mut self) {
        if self.base_url.trim().is_empty() {
            if let Ok(url) = std::env::var("API_BASE_URL") {
                self.base_url = url;
            }
        }
        if self.api_token.is_none() {
            self.api_token = std::env::var("API_TOKEN").ok().filter(|t| !t.trim().is_empty());
        }
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(anyhow!("upstream.base_url is empty; set it in config.toml or API_BASE_URL"));
        }
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("upstream.base_url must start with http:// or https://"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("upstream.request_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
