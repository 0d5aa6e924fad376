//! Crawl engine - round-based crawl orchestration
//!
//! This module contains the main crawl loop. Each round:
//! - Takes a batch of URLs from the front of the frontier
//! - Picks a proxy per URL (when proxies are in use)
//! - Fetches the whole batch concurrently and waits for every fetch
//! - Requeues failures, extracts links and records from successes
//! - Flushes the output sink once enough ratings are buffered
//!
//! All state (frontier, visited set, proxy pool, buffers) is mutated only
//! between rounds, on the task driving the engine. The fetch fan-out itself
//! just returns `(url, content)` pairs.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, build_proxied_client, fetch_page, FetchOutcome};
use crate::crawler::frontier::{Frontier, RequeueOutcome};
use crate::extract::extract_page;
use crate::output::{CrawlStats, OutputSink};
use crate::proxy::{ProxyCriteria, ProxyPool};
use crate::{HarvestError, ProxyError};
use futures::future::join_all;
use rand::Rng;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

/// Engine settings derived from the configuration
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// URLs fetched concurrently per round
    pub batch_size: usize,

    /// Route fetches through the proxy pool
    pub use_proxy: bool,

    /// Criteria every selected proxy must satisfy
    pub proxy_criteria: ProxyCriteria,

    /// Per-fetch time bound
    pub request_timeout: Duration,

    /// Upper bound of the random sleep after a proxy-less round
    pub throttle_max: Duration,

    /// Failures tolerated per URL; 0 requeues forever
    pub max_retries: u32,

    /// Origin that extracted links are rooted at
    pub origin: Url,

    /// Flush leftover records once the frontier drains
    pub flush_on_complete: bool,
}

impl EngineSettings {
    /// Derives engine settings from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Ok(Self {
            batch_size: config.crawler.batch_size,
            use_proxy: config.proxy.enabled,
            proxy_criteria: ProxyCriteria {
                require_https: config.proxy.require_https,
                require_search_engine_passed: config.proxy.require_search_engine_passed,
            },
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            throttle_max: Duration::from_secs(config.crawler.throttle_max_secs),
            max_retries: config.crawler.max_retries,
            origin: Url::parse(&config.site.origin)?,
            flush_on_complete: config.output.flush_on_complete,
        })
    }
}

/// Outcome counts of a single round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// URLs taken from the frontier
    pub fetched: usize,

    /// Fetches that returned content
    pub succeeded: usize,

    /// Fetches that returned nothing
    pub failed: usize,
}

/// The crawl engine
///
/// Collaborators are passed in: the proxy pool to pick endpoints from and
/// the output sink that owns the record buffers.
pub struct Engine {
    settings: EngineSettings,
    frontier: Frontier,
    proxies: ProxyPool,
    sink: OutputSink,
    client: Client,
    proxy_clients: HashMap<String, Client>,
    stats: CrawlStats,
}

impl Engine {
    /// Creates a new engine with an empty frontier
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Ready to be seeded and run
    /// * `Err(HarvestError)` - The HTTP client could not be built, or the batch size is zero
    pub fn new(
        settings: EngineSettings,
        proxies: ProxyPool,
        sink: OutputSink,
    ) -> Result<Self, HarvestError> {
        if settings.batch_size == 0 {
            return Err(HarvestError::InvalidArgument(
                "batch size must be positive".to_string(),
            ));
        }

        let client = build_http_client(settings.request_timeout)?;
        let frontier = Frontier::new(settings.max_retries);

        Ok(Self {
            settings,
            frontier,
            proxies,
            sink,
            client,
            proxy_clients: HashMap::new(),
            stats: CrawlStats::new(),
        })
    }

    /// Appends a URL to the frontier
    pub fn seed(&mut self, url: impl Into<String>) {
        self.frontier.push(url);
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn proxies(&self) -> &ProxyPool {
        &self.proxies
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Runs rounds until the frontier is empty
    ///
    /// With proxies enabled and an empty pool, the pool is refreshed first; a
    /// failed refresh aborts the run. There is no resumption: the run either
    /// drains the frontier or returns an error.
    ///
    /// Without a retry cap, a URL that keeps failing is requeued forever and
    /// the frontier never drains.
    ///
    /// When a round aborts the run (typically `NoEligibleProxy` once the last
    /// usable proxy is discarded), buffered records are still flushed under
    /// `flush_on_complete` before the error is returned.
    pub async fn run(&mut self) -> Result<CrawlStats, HarvestError> {
        let start_time = Instant::now();

        if self.settings.use_proxy && self.proxies.is_empty() {
            tracing::info!("Updating proxies...");
            self.proxies.refresh(&self.client).await?;
        }

        while !self.frontier.is_empty() {
            if let Err(e) = self.run_round().await {
                tracing::error!(
                    "Crawl aborted: {} ({} URLs left in frontier)",
                    e,
                    self.frontier.len()
                );
                self.flush_after_abort(&e);
                return Err(e);
            }
        }
        tracing::info!("Frontier is empty, crawl complete");

        if self.settings.flush_on_complete {
            let report = self.sink.flush()?;
            self.record_flush(report.ratings, report.metadata);
        }

        tracing::info!(
            "Crawl finished in {:?}: {} rounds, {} pages, {} ratings and {} movies written",
            start_time.elapsed(),
            self.stats.rounds,
            self.stats.pages_visited,
            self.stats.ratings_written,
            self.stats.metadata_written
        );

        Ok(self.stats.clone())
    }

    /// Runs a single fetch-then-dispatch round
    ///
    /// Proxies for the whole batch are chosen before any URL leaves the
    /// frontier, so a `NoEligibleProxy` error loses nothing.
    pub async fn run_round(&mut self) -> Result<RoundReport, HarvestError> {
        let size = self.settings.batch_size.min(self.frontier.len());
        let proxies = self.select_proxies(size)?;
        let batch = self.frontier.next_batch(size);
        self.stats.rounds += 1;

        tracing::info!(
            "Round {}: batch {}, {} left in frontier, {} visited",
            self.stats.rounds,
            batch.len(),
            self.frontier.len(),
            self.frontier.visited_count()
        );

        let mut jobs = Vec::with_capacity(batch.len());
        for (url, proxy) in batch.into_iter().zip(proxies) {
            let client = self.client_for(proxy.as_deref())?;
            jobs.push((url, proxy, client));
        }

        let outcomes = join_all(
            jobs.into_iter()
                .map(|(url, proxy, client)| async move { fetch_page(&client, url, proxy).await }),
        )
        .await;

        if !self.settings.use_proxy {
            self.throttle().await;
        }

        let mut report = RoundReport {
            fetched: outcomes.len(),
            ..RoundReport::default()
        };
        for outcome in outcomes {
            if outcome.content.is_ok() {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
            self.fold_outcome(outcome);
        }

        if let Some(flushed) = self.sink.flush_if_threshold()? {
            self.record_flush(flushed.ratings, flushed.metadata);
        }

        Ok(report)
    }

    /// Picks one proxy per upcoming fetch, or `None`s when proxies are off
    fn select_proxies(&self, count: usize) -> Result<Vec<Option<String>>, ProxyError> {
        if !self.settings.use_proxy {
            return Ok(vec![None; count]);
        }

        (0..count)
            .map(|_| self.proxies.select(self.settings.proxy_criteria).map(Some))
            .collect()
    }

    /// Returns the client for a proxy address, building and caching it on first use
    fn client_for(&mut self, proxy: Option<&str>) -> Result<Client, HarvestError> {
        let Some(addr) = proxy else {
            return Ok(self.client.clone());
        };

        if let Some(client) = self.proxy_clients.get(addr) {
            return Ok(client.clone());
        }

        let client = build_proxied_client(addr, self.settings.request_timeout)?;
        self.proxy_clients.insert(addr.to_string(), client.clone());
        Ok(client)
    }

    /// Sleeps a random whole number of seconds up to the throttle bound
    async fn throttle(&self) {
        let max_secs = self.settings.throttle_max.as_secs();
        if max_secs == 0 {
            return;
        }

        let secs = rand::thread_rng().gen_range(0..=max_secs);
        tracing::info!("Sleep {} secs...", secs);
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    /// Applies one fetch result to the crawl state
    fn fold_outcome(&mut self, outcome: FetchOutcome) {
        match outcome.content {
            Ok(content) => self.process_page(&outcome.url, &content),
            Err(failure) => {
                self.stats.fetch_failures += 1;
                tracing::info!("Fetching {} failed: {}", outcome.url, failure);

                if let Some(addr) = outcome.proxy {
                    if self.proxies.discard(&addr) {
                        self.stats.proxies_discarded += 1;
                    }
                    self.proxy_clients.remove(&addr);
                }

                let url = outcome.url;
                match self.frontier.requeue(url.clone()) {
                    RequeueOutcome::Requeued => {
                        self.stats.requeued += 1;
                        tracing::debug!(
                            "Requeued {} (failure {})",
                            url,
                            self.frontier.failure_count(&url)
                        );
                    }
                    RequeueOutcome::Dropped => {
                        self.stats.dropped += 1;
                        tracing::warn!(
                            "Giving up on {} after {} failures",
                            url,
                            self.settings.max_retries + 1
                        );
                    }
                }
            }
        }
    }

    /// Marks a fetched page visited, queues its new links and buffers its records
    ///
    /// Pages already visited are ignored.
    fn process_page(&mut self, url: &str, content: &str) {
        if !self.frontier.mark_visited(url) {
            tracing::debug!("Skipping already visited {}", url);
            return;
        }
        self.stats.pages_visited += 1;
        tracing::info!("Url {} visited", url);

        let page = extract_page(url, content, &self.settings.origin);

        let added = self.frontier.extend(page.links);
        tracing::info!("{} links added", added);

        if let Some(metadata) = page.metadata {
            self.sink.accumulate_metadata(metadata);
        }
        self.sink.accumulate_ratings(page.ratings);
    }

    /// Writes what is still buffered after a round error
    ///
    /// Skipped after an output error: the buffers were just kept by a
    /// rolled-back flush and retrying it would fail the same way.
    fn flush_after_abort(&mut self, error: &HarvestError) {
        if !self.settings.flush_on_complete || matches!(error, HarvestError::Output(_)) {
            return;
        }

        match self.sink.flush() {
            Ok(report) => self.record_flush(report.ratings, report.metadata),
            Err(flush_error) => tracing::error!(
                "Flush after aborted crawl failed, {} ratings and {} movies lost: {}",
                self.sink.pending_ratings().len(),
                self.sink.pending_metadata().len(),
                flush_error
            ),
        }
    }

    fn record_flush(&mut self, ratings: usize, metadata: usize) {
        if ratings == 0 && metadata == 0 {
            return;
        }
        self.stats.flushes += 1;
        self.stats.ratings_written += ratings as u64;
        self.stats.metadata_written += metadata as u64;
    }
}
