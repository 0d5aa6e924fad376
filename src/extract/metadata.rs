use crate::extract::selector;
use crate::output::MetadataRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static RUNNING_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)분").expect("running time pattern is valid"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+|\s{2,}").expect("whitespace pattern is valid"));

static SUMMARY: LazyLock<Selector> = LazyLock::new(|| selector("div.movie_summary"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("strong.tit_movie"));
static DETAIL_LIST: LazyLock<Selector> = LazyLock::new(|| selector("dl.list_movie"));
static DETAIL: LazyLock<Selector> = LazyLock::new(|| selector("dd"));

/// Placeholder stored when a text field is missing
const NOT_AVAILABLE: &str = "N/A";

/// Removes tab runs and runs of two or more whitespace characters entirely
///
/// Single spaces are kept; longer runs are deleted rather than shrunk, so
/// `"우리집   (2019)"` becomes `"우리집(2019)"`.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, "").into_owned()
}

fn trimmed_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_running_time(text: Option<String>) -> i32 {
    text.and_then(|t| {
        RUNNING_TIME
            .captures(&t)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
    .unwrap_or(-1)
}

/// Reads the movie summary block of an item detail page
///
/// The title and the detail list are required; without them no record is
/// produced. Genre and country fall back to `"N/A"` and the running time to
/// `-1` when missing or unparseable.
pub fn extract_metadata(document: &Html, movie_id: &str) -> Option<MetadataRecord> {
    let summary = document.select(&SUMMARY).next()?;
    let title = summary.select(&TITLE).next().and_then(trimmed_text)?;
    let details: Vec<ElementRef<'_>> = summary
        .select(&DETAIL_LIST)
        .next()?
        .select(&DETAIL)
        .collect();

    let field = |index: usize| details.get(index).copied().and_then(trimmed_text);

    let genre = field(0).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let country = field(1).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let running_time = parse_running_time(field(3));

    Some(MetadataRecord {
        movie_id: movie_id.to_string(),
        title: collapse_whitespace(&title),
        genre: collapse_whitespace(&genre),
        country: collapse_whitespace(&country),
        running_time,
    })
}
