use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_core::ShortenerError;
use thiserror::Error;
use tracing::{debug, error};

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Shortener(ShortenerError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            AppError::Shortener(ShortenerError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Shortener(ShortenerError::Backend(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Shortener(ShortenerError::Backend(e)) => {
                error!(error = %e, "storage backend failure");
                // backend details stay in the logs
                status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            }
            AppError::Shortener(ShortenerError::NotFound(_)) => {
                debug!(error = %self, "short link not found");
                "unknown short link".to_string()
            }
            other => {
                debug!(error = %other, "rejected request");
                other.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
