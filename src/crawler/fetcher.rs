//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the direct client and per-proxy clients
//! - Rotating the User-Agent header per request
//! - Folding every kind of failure into a single "no content" outcome

use rand::seq::SliceRandom;
use reqwest::{header::USER_AGENT, Client, Proxy, StatusCode};
use std::fmt;
use std::time::Duration;

/// Browser User-Agent strings rotated across requests
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:54.0) Gecko/20100101 Firefox/54.0",
    "Mozilla/5.0 (X11; Linux i686; rv:64.0) Gecko/20100101 Firefox/64.0",
    "Mozilla/5.0 (Windows NT 6.2; WOW64; rv:63.0) Gecko/20100101 Firefox/63.0",
    "Mozilla/5.0 (Macintosh; U; Intel Mac OS X 10.13; ko; rv:1.9.1b2) Gecko/20081201 Firefox/60.0",
];

/// Picks one User-Agent uniformly at random
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Why a fetch produced no content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Server answered with something other than 200
    Status(u16),

    /// Connection (direct or through the proxy) could not be established
    Connect(String),

    /// The request exceeded its time bound
    Timeout,

    /// Any other transport error, including reading the body
    Transport(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Status(code) => write!(f, "HTTP {}", code),
            FetchFailure::Connect(e) => write!(f, "connection failed ({})", e),
            FetchFailure::Timeout => write!(f, "connection failed (timeout)"),
            FetchFailure::Transport(e) => write!(f, "transport error ({})", e),
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchFailure::Timeout
        } else if e.is_connect() {
            FetchFailure::Connect(e.to_string())
        } else {
            FetchFailure::Transport(e.to_string())
        }
    }
}

/// Result of fetching one URL
#[derive(Debug)]
pub struct FetchOutcome {
    /// The URL that was requested
    pub url: String,

    /// Proxy address the request went through, if any
    pub proxy: Option<String>,

    /// Decoded page content, or why there is none
    pub content: Result<String, FetchFailure>,
}

/// Builds the client used for direct (proxy-less) fetches
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds a client that routes every request through `proxy_addr` (`host:port`)
pub fn build_proxied_client(proxy_addr: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .proxy(Proxy::all(format!("http://{}", proxy_addr))?)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a random User-Agent
///
/// Never fails: a non-200 status, a connection problem or a timeout all
/// come back as `content: Err(..)` so the caller can requeue the URL.
/// The body is decoded as UTF-8; invalid sequences are replaced.
pub async fn fetch_page(client: &Client, url: String, proxy: Option<String>) -> FetchOutcome {
    let content = fetch_content(client, &url).await;
    FetchOutcome {
        url,
        proxy,
        content,
    }
}

async fn fetch_content(client: &Client, url: &str) -> Result<String, FetchFailure> {
    let response = client
        .get(url)
        .header(USER_AGENT, random_user_agent())
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchFailure::Status(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
