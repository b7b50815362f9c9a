use thiserror::Error;

/// Errors returned by [`expand`](crate::prompt::expand) and
/// [`run`](crate::runner::run).
///
/// Per-task failures never show up here; they are delivered as
/// [`JobResult::Failure`](crate::types::JobResult::Failure) items.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Structurally invalid input, rejected before any work is dispatched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl BatchError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BatchError::InvalidArgument(message.into())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BatchError>;
