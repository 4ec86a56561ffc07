//! Error types for document access, region persistence, and the pipeline.
//!
//! Uses [`thiserror`]. Only region-file errors and pool construction are
//! fatal to a run; [`SourceError`] is always recovered at document
//! granularity by the pipeline.

use boxtract_core::RegionError;
use thiserror::Error;

/// Error opening or reading a single document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file is not a parseable PDF.
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Encrypted documents are not supported.
    #[error("document is encrypted")]
    Encrypted,

    /// Error reading document data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document contains no pages.
    #[error("document has no pages")]
    NoPages,
}

/// Error loading or saving a persisted region-definition file.
///
/// Fatal to the load operation: a malformed file never yields a
/// partially-loaded store.
#[derive(Debug, Error)]
pub enum RegionFileError {
    #[error("failed to read region file: {0}")]
    Io(#[from] std::io::Error),

    #[error("region file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Region(#[from] RegionError),
}

/// Error setting up the batch run itself (not a per-document failure).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to build worker pool: {0}")]
    Pool(String),
}
