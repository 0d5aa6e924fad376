//! Buffered, append-only CSV output
//!
//! Records accumulate in memory and are appended to `metadata.csv` and
//! `ratings.csv` once enough ratings are buffered. A flush either lands in
//! both files or in neither: if the second append fails, the first file is
//! truncated back to its previous length and the buffers are kept.
//!
//! The two appends run one after the other, with blocking `std::fs` calls on
//! the engine task: the rollback needs to know which destination already
//! landed, and the engine is not fetching while it flushes between rounds.

use crate::output::records::{MetadataRecord, RatingRecord};
use crate::OutputError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the metadata destination
pub const METADATA_FILE: &str = "metadata.csv";

/// File name of the ratings destination
pub const RATINGS_FILE: &str = "ratings.csv";

/// Default number of buffered ratings that triggers a flush
pub const DEFAULT_FLUSH_THRESHOLD: usize = 100;

/// Counts of rows written by one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub ratings: usize,
    pub metadata: usize,
}

/// In-memory record buffers with threshold-triggered durable appends
#[derive(Debug)]
pub struct OutputSink {
    directory: PathBuf,
    threshold: usize,
    ratings: Vec<RatingRecord>,
    metadata: Vec<MetadataRecord>,
}

/// A destination opened for appending, remembering where this flush started
struct PendingAppend {
    file: File,
    path: PathBuf,
    start_len: u64,
}

impl PendingAppend {
    fn open(path: PathBuf) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let start_len = file.metadata()?.len();
        Ok(Self {
            file,
            path,
            start_len,
        })
    }

    fn write(&mut self, chunk: &str) -> std::io::Result<()> {
        self.file.write_all(chunk.as_bytes())?;
        self.file.flush()
    }

    fn rollback(&self) {
        if let Err(e) = self.file.set_len(self.start_len) {
            tracing::error!(
                "Failed to roll back {} to {} bytes: {}",
                self.path.display(),
                self.start_len,
                e
            );
        }
    }
}

/// Newline-joins lines into one chunk, with a trailing newline
fn join_lines<I: IntoIterator<Item = String>>(lines: I) -> String {
    let mut chunk = String::new();
    for line in lines {
        chunk.push_str(&line);
        chunk.push('\n');
    }
    chunk
}

impl OutputSink {
    /// Creates a sink writing under `directory`
    pub fn new(directory: impl Into<PathBuf>, threshold: usize) -> Self {
        Self {
            directory: directory.into(),
            threshold,
            ratings: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Directory the CSV files live in
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.directory.join(METADATA_FILE)
    }

    pub fn ratings_path(&self) -> PathBuf {
        self.directory.join(RATINGS_FILE)
    }

    /// Buffers rating rows
    pub fn accumulate_ratings<I: IntoIterator<Item = RatingRecord>>(&mut self, records: I) {
        self.ratings.extend(records);
    }

    /// Buffers one movie summary
    pub fn accumulate_metadata(&mut self, record: MetadataRecord) {
        self.metadata.push(record);
    }

    /// Ratings waiting for the next flush
    pub fn pending_ratings(&self) -> &[RatingRecord] {
        &self.ratings
    }

    /// Movie summaries waiting for the next flush
    pub fn pending_metadata(&self) -> &[MetadataRecord] {
        &self.metadata
    }

    /// Returns true once the ratings buffer has reached the threshold
    pub fn should_flush(&self) -> bool {
        self.ratings.len() >= self.threshold
    }

    /// Flushes only if the ratings buffer has reached the threshold
    ///
    /// # Returns
    ///
    /// * `Ok(Some(FlushReport))` - Buffers were written and cleared
    /// * `Ok(None)` - Below threshold, nothing written
    /// * `Err(OutputError)` - Nothing written, buffers kept
    pub fn flush_if_threshold(&mut self) -> Result<Option<FlushReport>, OutputError> {
        if !self.should_flush() {
            return Ok(None);
        }
        self.flush().map(Some)
    }

    /// Appends every buffered row to the two destinations, then clears the buffers
    ///
    /// Empty buffers are not written, so no blank lines are appended.
    pub fn flush(&mut self) -> Result<FlushReport, OutputError> {
        if self.ratings.is_empty() && self.metadata.is_empty() {
            return Ok(FlushReport::default());
        }

        std::fs::create_dir_all(&self.directory)?;

        let metadata_chunk = join_lines(self.metadata.iter().map(MetadataRecord::to_csv_line));
        let ratings_chunk = join_lines(self.ratings.iter().map(RatingRecord::to_csv_line));

        let mut written: Vec<PendingAppend> = Vec::with_capacity(2);
        for (path, chunk) in [
            (self.metadata_path(), metadata_chunk),
            (self.ratings_path(), ratings_chunk),
        ] {
            if chunk.is_empty() {
                continue;
            }

            let result = PendingAppend::open(path.clone()).and_then(|mut append| {
                let outcome = append.write(&chunk);
                // A failed write may have left a partial chunk behind.
                if outcome.is_err() {
                    append.rollback();
                }
                outcome.map(|_| append)
            });

            match result {
                Ok(append) => written.push(append),
                Err(source) => {
                    for append in &written {
                        append.rollback();
                    }
                    tracing::error!(
                        "Flush to {} failed, {} ratings and {} movies kept in memory",
                        path.display(),
                        self.ratings.len(),
                        self.metadata.len()
                    );
                    return Err(OutputError::RolledBack {
                        destination: path.display().to_string(),
                        source,
                    });
                }
            }
        }

        let report = FlushReport {
            ratings: self.ratings.len(),
            metadata: self.metadata.len(),
        };
        self.ratings.clear();
        self.metadata.clear();

        tracing::info!(
            "{} ratings and {} movies flushed",
            report.ratings,
            report.metadata
        );
        Ok(report)
    }
}
