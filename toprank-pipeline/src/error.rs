//! Loader error types.
//!
//! Ranking itself never fails; only reading series from disk can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("Failed to open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported series format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid series shape: {0}")]
    InvalidShape(String),
}

/// Result type alias for loader operations.
pub type RankResult<T> = Result<T, RankError>;
