//! Run statistics collected by the crawl engine

/// Counters describing one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Fetch rounds executed
    pub rounds: u64,

    /// Pages fetched successfully and handed to extraction
    pub pages_visited: u64,

    /// Fetches that produced no content
    pub fetch_failures: u64,

    /// Failed URLs put back at the tail of the frontier
    pub requeued: u64,

    /// Failed URLs given up on after exceeding the retry cap
    pub dropped: u64,

    /// Proxies removed from the pool after a failed fetch
    pub proxies_discarded: u64,

    /// Rating rows written to disk
    pub ratings_written: u64,

    /// Metadata rows written to disk
    pub metadata_written: u64,

    /// Successful flushes
    pub flushes: u64,
}

impl CrawlStats {
    /// Creates an empty set of counters
    pub fn new() -> Self {
        Self::default()
    }
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Rounds:            {}", stats.rounds);
    println!("Pages visited:     {}", stats.pages_visited);
    println!();

    println!("Fetch failures:    {}", stats.fetch_failures);
    println!("  Requeued:        {}", stats.requeued);
    println!("  Dropped:         {}", stats.dropped);
    println!("Proxies discarded: {}", stats.proxies_discarded);
    println!();

    println!("Flushes:           {}", stats.flushes);
    println!("Ratings written:   {}", stats.ratings_written);
    println!("Movies written:    {}", stats.metadata_written);
}
