use crate::services::posts::PostError;
use crate::services::uploads::UploadError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => {
                (StatusCode::NOT_FOUND, Html(NOT_FOUND_FALLBACK.to_string())).into_response()
            }
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response(),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            Self::Internal(err) => {
                tracing::error!("Application error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

// Handlers with template access render the themed 404; this covers the rest.
const NOT_FOUND_FALLBACK: &str = "<!doctype html><title>Not Found</title><h1>404 Not Found</h1>";

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Validation(msg) => Self::Validation(msg),
            PostError::NotFound => Self::NotFound,
            PostError::Forbidden => Self::Forbidden,
            PostError::Conflict => Self::Conflict("slug is already taken".into()),
            PostError::Storage(e) => Self::Internal(e),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Rejected(msg) => Self::Validation(msg),
            UploadError::Storage(e) => Self::Internal(e),
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        Self::Internal(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
