use crate::extract::links::USER_ID;
use crate::extract::selector;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static REVIEW_BLOCK: LazyLock<Selector> = LazyLock::new(|| selector("div.review_info"));
static RATE_BLOCK: LazyLock<Selector> = LazyLock::new(|| selector("div.rate_info"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static STRONG: LazyLock<Selector> = LazyLock::new(|| selector("strong"));
static GRADE: LazyLock<Selector> = LazyLock::new(|| selector("em.emph_grade"));
static RATE: LazyLock<Selector> = LazyLock::new(|| selector("em.emph_rate"));
static SUBJECT: LazyLock<Selector> = LazyLock::new(|| selector("a.tit_subject"));

/// Class marking the reviewer's profile link inside a review block
const GRADE_LINK_CLASS: &str = "#grade";

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Finds the reviewer link: either an `a.#grade` or the anchor inside a `strong.#grade`
fn grade_link<'a>(block: ElementRef<'a>) -> Option<ElementRef<'a>> {
    block
        .select(&ANCHOR)
        .find(|a| has_class(a, GRADE_LINK_CLASS))
        .or_else(|| {
            block
                .select(&STRONG)
                .find(|s| has_class(s, GRADE_LINK_CLASS))
                .and_then(|s| s.select(&ANCHOR).next())
        })
}

fn numeric_text(block: ElementRef<'_>, target: &Selector) -> Option<i32> {
    block
        .select(target)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .parse()
        .ok()
}

/// Reads `(user id, rating)` pairs from the review blocks of a movie page
///
/// Blocks without a reviewer link carrying a `uid`, or without a numeric
/// grade, are skipped.
pub fn extract_ratings_per_movie(document: &Html) -> Vec<(String, i32)> {
    document
        .select(&REVIEW_BLOCK)
        .filter_map(|block| {
            let href = grade_link(block)?.value().attr("href")?;
            let user_id = USER_ID.captures(href)?.get(1)?.as_str().to_string();
            let rating = numeric_text(block, &GRADE)?;
            Some((user_id, rating))
        })
        .collect()
}

/// Reads `(movie id, rating)` pairs from the rate-info blocks of a user page
pub fn extract_ratings_per_user(document: &Html) -> Vec<(String, i32)> {
    document
        .select(&RATE_BLOCK)
        .filter_map(|block| {
            let movie_id = block.select(&SUBJECT).next()?.value().attr("name")?;
            let rating = numeric_text(block, &RATE)?;
            Some((movie_id.to_string(), rating))
        })
        .collect()
}
