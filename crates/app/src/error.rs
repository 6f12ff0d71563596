use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use services::{CatalogError, PlayError};

/// Failures a handler can return; everything else is answered with a redirect.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Play(#[from] PlayError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Catalog(CatalogError::Category(_) | CatalogError::Question(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()).into_response()
            }
            _ => {
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
