//! Error types for the host runtime.

/// All errors that can occur in the host.
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] pausepoint::PausepointError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No element matches selector: {0}")]
    NoSuchElement(String),
}

pub type HostResult<T> = Result<T, HostError>;
