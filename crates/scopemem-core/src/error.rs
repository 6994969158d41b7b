//! Error types for scopemem I/O boundaries.
//!
//! The retention engine and query router are total and never return these;
//! errors only arise from persistence, configuration, and the search backend.

/// Errors produced by persistence and configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("unsupported activation index version {found} (supported up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl From<toml::de::Error> for MemoryError {
    fn from(err: toml::de::Error) -> Self {
        MemoryError::Config(err.to_string())
    }
}

/// Result type for memory operations.
pub type MemoryResult<T> = std::result::Result<T, MemoryError>;

/// Errors a search executor may report for a single dataset search.
///
/// The router absorbs every variant; a failed search contributes no results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("search cancelled before completion")]
    Cancelled,

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}
