//! Workbench error types.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::IdentifierError;

/// Errors surfaced by the editing components.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(#[from] IdentifierError),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Timetable store unavailable: {0}")]
    RemoteUnavailable(RepositoryError),

    #[error("Timetable store rejected the request: {0}")]
    RemoteRejected(RepositoryError),

    /// A candidate response arrived after a newer query superseded it.
    #[error("Discarded stale response for {section} at {timeslot}")]
    StaleResponse { section: String, timeslot: String },
}

impl WorkbenchError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidTransition(message.into())
    }

    /// Errors that must not be shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::StaleResponse { .. })
    }
}

impl From<RepositoryError> for WorkbenchError {
    fn from(err: RepositoryError) -> Self {
        if err.is_unavailable() {
            Self::RemoteUnavailable(err)
        } else {
            Self::RemoteRejected(err)
        }
    }
}

pub type WorkbenchResult<T> = Result<T, WorkbenchError>;

/// Await a store call, giving up after `timeout`.
pub(crate) async fn within<T, F>(timeout: Duration, operation: &str, call: F) -> WorkbenchResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(WorkbenchError::from),
        Err(_) => Err(WorkbenchError::RemoteUnavailable(
            RepositoryError::timeout_with_context(
                format!("No response within {} ms", timeout.as_millis()),
                ErrorContext::new(operation),
            ),
        )),
    }
}
