use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by HTTP handlers.
///
/// Client errors carry their message to the response body. Server-side
/// failures are logged and reported without detail.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Not Found")]
    NotFound,

    #[error("Unsupported locale: '{0}'")]
    UnsupportedLocale(String),

    #[error("{}", .0.body_text())]
    InvalidJson(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    InvalidPath(#[from] PathRejection),

    #[error("{}", .0.body_text())]
    InvalidMultipart(#[from] MultipartRejection),

    #[error("{}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::UnsupportedLocale(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidJson(rejection) => rejection.status(),
            AppError::InvalidPath(rejection) => rejection.status(),
            AppError::InvalidMultipart(rejection) => rejection.status(),
            AppError::Multipart(e) => e.status(),
            AppError::Database(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Request failed: {:#}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
