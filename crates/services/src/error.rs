//! Shared error types for the services crate.
//!
//! The display strings on the named variants (and on the wrapped validation
//! errors) are the exact messages clients see; handlers forward them verbatim,
//! so changing one here changes the API contract.

use thiserror::Error;

use course_core::model::{
    ParseAnswerOptionError, ParseContentTypeError, ProgressError, UserIdError,
};
use storage::repository::StorageError;

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error("Chapter not found")]
    ChapterNotFound,
    #[error("Video not found for this chapter")]
    VideoNotFound,
    #[error("No quiz questions found for this chapter")]
    NoQuizQuestions,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error(transparent)]
    UserId(#[from] UserIdError),
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    ContentType(#[from] ParseContentTypeError),
    #[error(transparent)]
    Pairing(#[from] ProgressError),
    #[error(transparent)]
    UserId(#[from] UserIdError),
    #[error("User not found")]
    UserNotFound,
    #[error("Chapter not found")]
    ChapterNotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Answer(#[from] ParseAnswerOptionError),
    #[error(transparent)]
    UserId(#[from] UserIdError),
    #[error("Quiz question not found")]
    QuestionNotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResumeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResumeServiceError {
    #[error("Chapter not found")]
    ChapterNotFound,
    #[error("No quiz questions found for this chapter")]
    NoQuizQuestions,
    #[error(transparent)]
    UserId(#[from] UserIdError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
