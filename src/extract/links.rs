use crate::extract::selector;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

static MOVIE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"movieId=([0-9]+)").expect("movie id pattern is valid"));
static PERSON_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"personId=([0-9]+)").expect("person id pattern is valid"));
pub(crate) static USER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"uid=([^&]+)").expect("user id pattern is valid"));
static PRODUCTION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"productionId=([0-9]+)").expect("production id pattern is valid")
});

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Hrefs containing this marker lead to ticketing pages and are never followed
const RESERVATION_MARKER: &str = "reservation";

/// Returns true if the href carries one of the followable identifier shapes
fn is_followable(href: &str) -> bool {
    [&*MOVIE_ID, &*PERSON_ID, &*USER_ID, &*PRODUCTION_ID]
        .iter()
        .any(|pattern| pattern.is_match(href))
}

/// Extracts all followable links from a page as absolute URLs
///
/// Only anchors whose href carries a movie, person, user or production
/// identifier are kept, minus reservation pages. Relative hrefs are resolved
/// against `origin`; links that end up on another origin are dropped.
///
/// The result is ordered, so identical content always yields the same
/// sequence of links.
pub fn extract_links(document: &Html, origin: &Url) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    for element in document.select(&ANCHOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();

        if href.is_empty() || href.contains(RESERVATION_MARKER) || !is_followable(href) {
            continue;
        }

        match origin.join(href) {
            Ok(absolute) if absolute.origin() == origin.origin() => {
                links.insert(absolute.to_string());
            }
            Ok(absolute) => {
                tracing::trace!("Skipping off-site link {}", absolute);
            }
            Err(e) => {
                tracing::trace!("Skipping unresolvable link {}: {}", href, e);
            }
        }
    }

    links
}

fn first_capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Pulls the `movieId` query value out of a URL
pub fn extract_movie_id(url: &str) -> Option<String> {
    first_capture(&MOVIE_ID, url)
}

/// Pulls the `uid` query value out of a URL
pub fn extract_user_id(url: &str) -> Option<String> {
    first_capture(&USER_ID, url)
}
