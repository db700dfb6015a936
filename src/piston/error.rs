use reqwest::StatusCode;
use thiserror::Error;

/// Anything that stops a run from producing a usable `run` block.
///
/// The `Display` text is what ends up on the second line of the output pane.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("execution service returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Schema(String),
}
