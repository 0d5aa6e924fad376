//! Rating-Harvest: a proxy-rotating movie rating crawler
//!
//! This crate walks the link graph of a movie site from a seed URL, extracts
//! movie metadata and user/movie rating pairs, and appends them to CSV files
//! as they accumulate.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod proxy;

use thiserror::Error;

/// Main error type for Rating-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Proxy error: {0}")]
    Proxy(#[from] ProxyError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Proxy pool errors
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Proxy list source returned HTTP {status}")]
    SourceUnavailable { status: u16 },

    #[error("Failed to download proxy list: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Proxy list contained no usable entries")]
    Empty,

    #[error("No eligible proxy among {pool_size} entries")]
    NoEligibleProxy { pool_size: usize },
}

/// Output sink errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Write to {destination} failed, flush rolled back: {source}")]
    RolledBack {
        destination: String,
        source: std::io::Error,
    },
}

/// Result type alias for Rating-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run, Engine};
pub use output::{CrawlStats, MetadataRecord, OutputSink, RatingRecord};
pub use proxy::{ProxyCriteria, ProxyEntry, ProxyPool};
