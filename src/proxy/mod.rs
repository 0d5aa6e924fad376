//! Rotating proxy support
//!
//! This module handles:
//! - Parsing the plaintext proxy list format
//! - Holding the current pool of proxy endpoints
//! - Picking an endpoint per request under caller-supplied criteria
//! - Dropping endpoints that failed a fetch

mod entry;
mod pool;

pub use entry::{parse_proxy_line, ProxyEntry};
pub use pool::{ProxyCriteria, ProxyPool};
