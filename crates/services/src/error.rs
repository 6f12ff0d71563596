//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{CategoryError, QuestionError};
use storage::repository::StorageError;

/// Errors emitted by `CatalogService`.
///
/// Unknown ids and integrity conflicts are not errors; see the service docs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the play engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
