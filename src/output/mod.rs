//! Output module for buffering and persisting harvested records
//!
//! This module handles:
//! - The rating and metadata record types and their CSV form
//! - Buffering records and appending them to disk past a threshold
//! - Recording crawl statistics

mod records;
mod sink;
pub mod stats;

pub use records::{MetadataRecord, RatingRecord};
pub use sink::{FlushReport, OutputSink, DEFAULT_FLUSH_THRESHOLD, METADATA_FILE, RATINGS_FILE};
pub use stats::{print_statistics, CrawlStats};
