//! Proxy pool with wholesale refresh and filtered random selection

use crate::proxy::entry::{parse_proxy_line, ProxyEntry};
use crate::ProxyError;
use rand::seq::SliceRandom;
use reqwest::{Client, StatusCode};

/// Predicates a selected proxy must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyCriteria {
    /// Proxy must tunnel HTTPS
    pub require_https: bool,

    /// Proxy must have passed the search engine check
    pub require_search_engine_passed: bool,
}

impl Default for ProxyCriteria {
    fn default() -> Self {
        Self {
            require_https: true,
            require_search_engine_passed: true,
        }
    }
}

impl ProxyCriteria {
    /// Returns true if the entry satisfies every required predicate
    pub fn accepts(&self, entry: &ProxyEntry) -> bool {
        (!self.require_https || entry.supports_https)
            && (!self.require_search_engine_passed || entry.google_passed)
    }
}

/// The set of proxies currently usable for outbound requests
///
/// The pool is replaced as a whole on every refresh and only shrinks in
/// between, as failing proxies are discarded.
#[derive(Debug, Clone)]
pub struct ProxyPool {
    source_url: String,
    entries: Vec<ProxyEntry>,
}

impl ProxyPool {
    /// Creates an empty pool that refreshes from `source_url`
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            entries: Vec::new(),
        }
    }

    /// Creates a pool pre-filled with entries (no source)
    pub fn from_entries(entries: Vec<ProxyEntry>) -> Self {
        Self {
            source_url: String::new(),
            entries,
        }
    }

    /// Downloads the proxy list and replaces the pool with its entries
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of entries now in the pool
    /// * `Err(ProxyError::SourceUnavailable)` - Source answered with a non-200 status
    /// * `Err(ProxyError::Transport)` - Source could not be reached
    /// * `Err(ProxyError::Empty)` - No line of the list parsed; the old pool is kept
    pub async fn refresh(&mut self, client: &Client) -> Result<usize, ProxyError> {
        tracing::info!("Retrieving proxy list from {}", self.source_url);

        let response = client.get(&self.source_url).send().await?;
        if response.status() != StatusCode::OK {
            tracing::warn!(
                "Failed to retrieve proxy list, status code = {}",
                response.status().as_u16()
            );
            return Err(ProxyError::SourceUnavailable {
                status: response.status().as_u16(),
            });
        }

        let content = response.text().await?;
        tracing::info!("Proxy list downloaded");

        let count = self.replace_from_list(&content)?;
        tracing::info!(
            "{} proxies loaded, {} eligible under default criteria",
            count,
            self.eligible_count(ProxyCriteria::default())
        );
        Ok(count)
    }

    /// Parses a proxy list document and replaces the pool with its entries
    pub fn replace_from_list(&mut self, content: &str) -> Result<usize, ProxyError> {
        let entries: Vec<ProxyEntry> = content.lines().filter_map(parse_proxy_line).collect();

        if entries.is_empty() {
            return Err(ProxyError::Empty);
        }

        self.entries = entries;
        Ok(self.entries.len())
    }

    /// Picks one proxy address uniformly at random among eligible entries
    ///
    /// Candidates are filtered first, so the call never resamples and fails
    /// immediately when nothing qualifies.
    pub fn select(&self, criteria: ProxyCriteria) -> Result<String, ProxyError> {
        let candidates: Vec<&ProxyEntry> =
            self.entries.iter().filter(|e| criteria.accepts(e)).collect();

        candidates
            .choose(&mut rand::thread_rng())
            .map(|entry| entry.addr.clone())
            .ok_or(ProxyError::NoEligibleProxy {
                pool_size: self.entries.len(),
            })
    }

    /// Removes the entry with the given address; absent addresses are ignored
    ///
    /// Returns true if an entry was removed.
    pub fn discard(&mut self, addr: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.addr != addr);
        let removed = self.entries.len() != before;
        if removed {
            tracing::debug!("Discarded proxy {} ({} left)", addr, self.entries.len());
        }
        removed
    }

    /// Number of entries in the pool
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the pool has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries satisfying `criteria`
    pub fn eligible_count(&self, criteria: ProxyCriteria) -> usize {
        self.entries.iter().filter(|e| criteria.accepts(e)).count()
    }

    /// All entries in list order
    pub fn entries(&self) -> &[ProxyEntry] {
        &self.entries
    }
}
