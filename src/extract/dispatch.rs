//! URL-shape routing of fetched pages to extraction routines

use crate::extract::{
    extract_links, extract_metadata, extract_movie_id, extract_ratings_per_movie,
    extract_ratings_per_user, extract_user_id, parse_document,
};
use crate::output::{MetadataRecord, RatingRecord};
use std::collections::BTreeSet;
use url::Url;

/// Page type, decided by substring match on the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A user's rated movie list (`other/moviePoint`)
    UserRatings,

    /// A movie detail page with summary and reviews (`moviedb/main`)
    MovieMain,

    /// A movie's review page (`moviedb/grade`)
    MovieGrade,

    /// Anything else; only links are extracted
    Other,
}

impl PageKind {
    /// Classifies a URL; the first matching shape wins
    pub fn classify(url: &str) -> Self {
        if url.contains("other/moviePoint") {
            PageKind::UserRatings
        } else if url.contains("moviedb/main") {
            PageKind::MovieMain
        } else if url.contains("moviedb/grade") {
            PageKind::MovieGrade
        } else {
            PageKind::Other
        }
    }
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// Followable links found on the page
    pub links: BTreeSet<String>,

    /// Movie summary, for item detail pages
    pub metadata: Option<MetadataRecord>,

    /// Rating rows produced by the page
    pub ratings: Vec<RatingRecord>,
}

/// Extracts links and domain records from a fetched page
///
/// Pages whose URL lacks the identifier their kind is keyed by still yield
/// links but no records.
pub fn extract_page(url: &str, content: &str, origin: &Url) -> ExtractedPage {
    let document = parse_document(content);
    let mut page = ExtractedPage {
        links: extract_links(&document, origin),
        ..ExtractedPage::default()
    };

    match PageKind::classify(url) {
        PageKind::UserRatings => {
            if let Some(user_id) = extract_user_id(url) {
                page.ratings = extract_ratings_per_user(&document)
                    .into_iter()
                    .map(|(movie_id, rating)| RatingRecord::new(&user_id, movie_id, rating))
                    .collect();
            }
        }
        kind @ (PageKind::MovieMain | PageKind::MovieGrade) => {
            if let Some(movie_id) = extract_movie_id(url) {
                if kind == PageKind::MovieMain {
                    page.metadata = extract_metadata(&document, &movie_id);
                }
                page.ratings = extract_ratings_per_movie(&document)
                    .into_iter()
                    .map(|(user_id, rating)| RatingRecord::new(user_id, &movie_id, rating))
                    .collect();
            }
        }
        PageKind::Other => {}
    }

    if !page.ratings.is_empty() {
        tracing::info!("Parsed {} ratings from {}", page.ratings.len(), url);
    }

    page
}
