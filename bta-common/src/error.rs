//! Common error types for bt-agenda

use thiserror::Error;

/// Common result type for bt-agenda operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the bt-agenda components
#[derive(Error, Debug)]
pub enum Error {
    /// Source site responded with a non-success status or was unreachable
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// Requested period lies strictly after the current ISO week
    #[error("No data for future periods (year {year}, week {week:?})")]
    FutureRange { year: i32, week: Option<u32> },

    /// A single agenda row could not be parsed; recovered per row
    #[error("Malformed agenda row: {0}")]
    MalformedRow(String),

    /// Persisted partition value is not valid JSON
    #[error("Stored value for {key} is corrupt: {reason}")]
    StoreCorruption { key: String, reason: String },

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error when encoding a partition or cache index
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
