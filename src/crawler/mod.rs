//! Crawler module for the round-based harvest loop
//!
//! This module contains the core crawling logic, including:
//! - The FIFO frontier and visited set
//! - HTTP fetching, directly or through a proxy
//! - The engine that drives rounds and dispatches pages to extraction

mod engine;
mod fetcher;
mod frontier;

pub use engine::{Engine, EngineSettings, RoundReport};
pub use fetcher::{
    build_http_client, build_proxied_client, fetch_page, random_user_agent, FetchFailure,
    FetchOutcome, USER_AGENTS,
};
pub use frontier::{Frontier, RequeueOutcome};

use crate::config::{validate, Config};
use crate::output::{CrawlStats, OutputSink};
use crate::proxy::ProxyPool;
use crate::HarvestError;
use std::path::PathBuf;
use url::Url;

/// Runs a complete crawl from a single seed URL
///
/// This is the main entry point. It will:
/// 1. Refresh the proxy pool (when `use_proxy` is set)
/// 2. Run fetch rounds of `batch_size` URLs until the frontier is empty
/// 3. Append records to `metadata.csv` and `ratings.csv` under `output_dir`
///
/// # Returns
///
/// * `Ok(CrawlStats)` - The frontier drained
/// * `Err(HarvestError)` - Bad arguments, proxy refresh failure, or a failed flush
///
/// # Example
///
/// ```no_run
/// use rating_harvest::crawler::run;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let seed = "https://movie.daum.net/moviedb/main?movieId=128635";
/// let stats = run(seed, "./res", true, 10).await?;
/// println!("{} ratings written", stats.ratings_written);
/// # Ok(())
/// # }
/// ```
pub async fn run(
    seed: &str,
    output_dir: impl Into<PathBuf>,
    use_proxy: bool,
    batch_size: usize,
) -> Result<CrawlStats, HarvestError> {
    let mut config = Config::default();
    config.output.directory = output_dir.into().to_string_lossy().into_owned();
    config.proxy.enabled = use_proxy;
    config.crawler.batch_size = batch_size;
    run_with_config(seed, &config).await
}

/// Runs a complete crawl from a single seed URL with explicit configuration
pub async fn run_with_config(seed: &str, config: &Config) -> Result<CrawlStats, HarvestError> {
    validate(config)?;
    let seed = Url::parse(seed)?;

    let settings = EngineSettings::from_config(config)?;
    let proxies = ProxyPool::new(config.proxy.source_url.clone());
    let sink = OutputSink::new(&config.output.directory, config.output.flush_threshold);

    let mut engine = Engine::new(settings, proxies, sink)?;
    engine.seed(seed.as_str());
    engine.run().await
}
