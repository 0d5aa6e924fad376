use crate::output::DEFAULT_FLUSH_THRESHOLD;
use serde::Deserialize;

/// Main configuration structure for Rating-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of URLs fetched concurrently per round
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Upper bound on a single fetch (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Upper bound of the random inter-round sleep when proxies are off (seconds)
    #[serde(rename = "throttle-max-secs")]
    pub throttle_max_secs: u64,

    /// Failures allowed per URL before it is dropped; 0 requeues forever
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            request_timeout_secs: 30,
            throttle_max_secs: 10,
            max_retries: 0,
        }
    }
}

/// Rotating proxy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Whether fetches go through the proxy pool
    pub enabled: bool,

    /// Plaintext proxy list location
    #[serde(rename = "source-url")]
    pub source_url: String,

    /// Only pick proxies that tunnel HTTPS
    #[serde(rename = "require-https")]
    pub require_https: bool,

    /// Only pick proxies that passed the search engine check
    #[serde(rename = "require-search-engine-passed")]
    pub require_search_engine_passed: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_url: "http://spys.me/proxy.txt".to_string(),
            require_https: true,
            require_search_engine_passed: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding metadata.csv and ratings.csv
    pub directory: String,

    /// Buffered rating count that triggers a flush
    #[serde(rename = "flush-threshold")]
    pub flush_threshold: usize,

    /// Write whatever is still buffered once the frontier drains
    #[serde(rename = "flush-on-complete")]
    pub flush_on_complete: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./res".to_string(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            flush_on_complete: true,
        }
    }
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin that relative links are rooted at
    pub origin: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://movie.daum.net".to_string(),
        }
    }
}
