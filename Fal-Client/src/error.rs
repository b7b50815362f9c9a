use thiserror::Error;

/// Errors returned by fal.ai operations.
#[derive(Error, Debug)]
pub enum FalError {
    /// fal.ai returned a non-success HTTP status.
    #[error("fal.ai returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response from fal.ai was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// A request parameter could not be parsed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request reached a terminal state without producing output.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Timed out waiting for the queued request to complete.
    #[error("Generation timed out after {0}s")]
    Timeout(u64),

    /// No API key was supplied.
    #[error("Missing fal.ai API key: {0}")]
    MissingCredentials(String),

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FalError>;
