//! HTTP error mapping.
//!
//! Every service error becomes an `ApiError`, and every `ApiError` renders as
//! `{"success": false, "message": ...}` with the matching status code. The
//! message text comes from the service error's `Display` impl, so the client
//! contract lives in one place; only `Internal` masks its detail.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use services::{
    ContentServiceError, ProgressServiceError, QuizServiceError, ResumeServiceError,
    UserServiceError,
};
use storage::repository::StorageError;

/// Request-level error with a client-facing message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was understood but fails validation (400).
    #[error("{0}")]
    BadRequest(String),

    /// The addressed resource does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The request clashes with existing state (409).
    #[error("{0}")]
    Conflict(String),

    /// Backend failure (500). The detail is logged, never returned.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "success": false, "message": message }));
        (self.status(), body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::Conflict => Self::Conflict(message),
            _ => Self::Internal(message),
        }
    }
}

impl From<ContentServiceError> for ApiError {
    fn from(err: ContentServiceError) -> Self {
        let message = err.to_string();
        match err {
            ContentServiceError::Storage(e) => e.into(),
            ContentServiceError::ChapterNotFound
            | ContentServiceError::VideoNotFound
            | ContentServiceError::NoQuizQuestions => Self::NotFound(message),
            _ => Self::Internal(message),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        let message = err.to_string();
        match err {
            UserServiceError::Storage(e) => e.into(),
            UserServiceError::UserId(_) => Self::BadRequest(message),
            UserServiceError::UserNotFound => Self::NotFound(message),
            _ => Self::Internal(message),
        }
    }
}

impl From<ProgressServiceError> for ApiError {
    fn from(err: ProgressServiceError) -> Self {
        let message = err.to_string();
        match err {
            ProgressServiceError::Storage(e) => e.into(),
            ProgressServiceError::ContentType(_)
            | ProgressServiceError::Pairing(_)
            | ProgressServiceError::UserId(_) => Self::BadRequest(message),
            ProgressServiceError::UserNotFound | ProgressServiceError::ChapterNotFound => {
                Self::NotFound(message)
            }
            _ => Self::Internal(message),
        }
    }
}

impl From<QuizServiceError> for ApiError {
    fn from(err: QuizServiceError) -> Self {
        let message = err.to_string();
        match err {
            QuizServiceError::Storage(e) => e.into(),
            QuizServiceError::Answer(_) | QuizServiceError::UserId(_) => Self::BadRequest(message),
            QuizServiceError::QuestionNotFound => Self::NotFound(message),
            _ => Self::Internal(message),
        }
    }
}

impl From<ResumeServiceError> for ApiError {
    fn from(err: ResumeServiceError) -> Self {
        let message = err.to_string();
        match err {
            ResumeServiceError::Storage(e) => e.into(),
            ResumeServiceError::UserId(_) => Self::BadRequest(message),
            ResumeServiceError::ChapterNotFound | ResumeServiceError::NoQuizQuestions => {
                Self::NotFound(message)
            }
            _ => Self::Internal(message),
        }
    }
}
