use std::io;

/// Errors that can stop a sweep.
///
/// Probe failures are deliberately absent: a failed probe is reported as
/// [`NOT_ALIVE`](crate::scanner::NOT_ALIVE), never as an error.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("error reading input: {0}")]
    Input(#[source] io::Error),

    #[error("error writing results: {0}")]
    Output(#[source] io::Error),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Result type for sweep operations
pub type Result<T> = std::result::Result<T, ScanError>;
