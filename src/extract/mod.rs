//! Extraction of links and domain records from fetched pages
//!
//! This module handles:
//! - Recognizing followable links by identifier shape
//! - Pulling movie and user identifiers out of URLs
//! - Reading movie metadata from an item detail page
//! - Reading rating pairs from review and rate-info blocks
//! - Routing a page to the right extraction by URL shape

mod dispatch;
mod links;
mod metadata;
mod ratings;

pub use dispatch::{extract_page, ExtractedPage, PageKind};
pub use links::{extract_links, extract_movie_id, extract_user_id};
pub use metadata::{collapse_whitespace, extract_metadata};
pub use ratings::{extract_ratings_per_movie, extract_ratings_per_user};

use scraper::{Html, Selector};

/// Parses fetched page content into a queryable document
pub fn parse_document(content: &str) -> Html {
    Html::parse_document(content)
}

/// Compiles a selector that is known to be valid at build time
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}
