//! Error types for the pausepoint library.
//!
//! Nothing on the page-context path surfaces these to the host page: extraction
//! misses are `None`, and relay or store failures are logged and dropped.

/// Errors that can occur in the pausepoint library.
#[derive(thiserror::Error, Debug)]
pub enum PausepointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Relay closed: {0}")]
    RelayClosed(String),

    #[error("Prompt surface error: {0}")]
    Surface(String),
}

/// Convenience result type.
pub type PausepointResult<T> = Result<T, PausepointError>;
