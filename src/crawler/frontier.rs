//! Crawl frontier and visited set
//!
//! The frontier is a plain FIFO queue: new links and failed URLs both go to
//! the back, batches are taken from the front. The visited set only grows.

use std::collections::{HashMap, HashSet, VecDeque};

/// What happened to a URL handed back after a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequeueOutcome {
    /// Appended to the back of the frontier
    Requeued,

    /// Failure count exceeded the retry cap; the URL is abandoned
    Dropped,
}

/// Pending URLs plus the set of URLs already processed
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    failures: HashMap<String, u32>,
    /// Failures tolerated per URL; 0 retries forever
    max_retries: u32,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// `max_retries` caps how often a failing URL is requeued; 0 keeps
    /// requeueing it indefinitely.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Appends a URL to the back of the queue unconditionally
    pub fn push(&mut self, url: impl Into<String>) {
        self.queue.push_back(url.into());
    }

    /// Appends every link not yet visited; returns how many were added
    ///
    /// Only the visited set is consulted. A link already waiting in the queue
    /// is appended again, so a link found on several pages before it is
    /// fetched is fetched once per copy; every copy after the first is skipped
    /// by `mark_visited` once its content comes back.
    pub fn extend<I>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.queue.len();
        for link in links {
            if !self.visited.contains(&link) {
                self.queue.push_back(link);
            }
        }
        self.queue.len() - before
    }

    /// Removes up to `size` URLs from the front of the queue
    pub fn next_batch(&mut self, size: usize) -> Vec<String> {
        let take = size.min(self.queue.len());
        self.queue.drain(..take).collect()
    }

    /// Marks a URL as visited
    ///
    /// Returns false if it already was, in which case the page must not be
    /// processed again.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }
        self.failures.remove(url);
        self.visited.insert(url.to_string())
    }

    /// Returns true if the URL has already been processed
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Hands a failed URL back, appending it to the back of the queue unless
    /// it has exhausted its retries
    pub fn requeue(&mut self, url: String) -> RequeueOutcome {
        let failures = self.failures.entry(url.clone()).or_insert(0);
        *failures += 1;

        if self.max_retries > 0 && *failures > self.max_retries {
            self.failures.remove(&url);
            return RequeueOutcome::Dropped;
        }

        self.queue.push_back(url);
        RequeueOutcome::Requeued
    }

    /// Number of failures recorded for a URL since it was last visited
    pub fn failure_count(&self, url: &str) -> u32 {
        self.failures.get(url).copied().unwrap_or(0)
    }

    /// Number of pending URLs
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true when no URL is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs processed so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Pending URLs in crawl order
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}
