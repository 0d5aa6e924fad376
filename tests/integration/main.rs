//! Integration tests for Rating-Harvest
//!
//! These tests use wiremock to stand in for the movie site and the proxy
//! list source, and run the crawler against them end-to-end.

mod crawl_tests;
mod proxy_tests;
