//! Error types for tcga-fetch
//!
//! Every library operation returns [`Result`]; the binary wraps these in
//! `anyhow` at the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for GDC queries, downloads and local parsing
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by a remote endpoint
    #[error("GDC API returned {status} for {url}")]
    Api { status: u16, url: String },

    /// Response envelope lacked `data.hits`
    #[error("No hits found in GDC response from {endpoint}")]
    MissingHits { endpoint: String },

    /// A download produced an HTML page instead of a data file
    #[error("Downloaded file is HTML, not a data file: {}", path.display())]
    HtmlPayload { path: PathBuf },

    /// Local file missing
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TSV writing/reading errors
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

impl FetchError {
    /// Whether a fresh attempt at the same request might succeed.
    ///
    /// Connection failures, timeouts, 5xx and 429 qualify; other 4xx
    /// responses fail fast.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(_) => true,
            FetchError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;
