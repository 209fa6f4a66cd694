use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{ChapterId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Pairing rules between the content type and its position field.
///
/// Display strings double as the client-facing validation messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("video_timestamp is required for video content type")]
    MissingVideoTimestamp,

    #[error("quiz_question_index is required for quiz content type")]
    MissingQuizQuestionIndex,
}

/// Raised when a content-type string is neither `video` nor `quiz`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid content type. Must be 'video' or 'quiz'")]
pub struct ParseContentTypeError;

//
// ─── CONTENT TYPE ──────────────────────────────────────────────────────────────
//

/// The kind of chapter content a progress row refers to.
///
/// A user holds at most one progress row per chapter per content type, so
/// video position and quiz position are tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Quiz,
}

impl ContentType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Quiz => "quiz",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ParseContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(ContentType::Video),
            "quiz" => Ok(ContentType::Quiz),
            _ => Err(ParseContentTypeError),
        }
    }
}

//
// ─── PROGRESS UPDATE ───────────────────────────────────────────────────────────
//

/// Validated payload of a progress save.
///
/// Construction enforces the pairing rules: a video update must carry a
/// playback timestamp and a quiz update must carry a question index. The
/// cross field may still be present (a client can park a quiz index while
/// saving video progress); a later save replaces all three fields wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    content_type: ContentType,
    video_timestamp: Option<u32>,
    quiz_question_index: Option<u32>,
    is_completed: bool,
}

impl ProgressUpdate {
    /// Creates a validated update.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the position field required by
    /// `content_type` is absent.
    pub fn new(
        content_type: ContentType,
        video_timestamp: Option<u32>,
        quiz_question_index: Option<u32>,
        is_completed: bool,
    ) -> Result<Self, ProgressError> {
        match content_type {
            ContentType::Video => {
                if video_timestamp.is_none() {
                    return Err(ProgressError::MissingVideoTimestamp);
                }
            }
            ContentType::Quiz => {
                if quiz_question_index.is_none() {
                    return Err(ProgressError::MissingQuizQuestionIndex);
                }
            }
        }
        Ok(Self {
            content_type,
            video_timestamp,
            quiz_question_index,
            is_completed,
        })
    }

    // Accessors
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    #[must_use]
    pub fn video_timestamp(&self) -> Option<u32> {
        self.video_timestamp
    }

    #[must_use]
    pub fn quiz_question_index(&self) -> Option<u32> {
        self.quiz_question_index
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
}

//
// ─── PROGRESS ROW ──────────────────────────────────────────────────────────────
//

/// One stored progress row.
///
/// At most one live row exists per (user, chapter, content type); saving again
/// replaces the mutable fields rather than appending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub id: i64,
    pub user_id: UserId,
    pub chapter_id: ChapterId,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_timestamp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_question_index: Option<u32>,
    pub is_completed: bool,
    pub last_updated: DateTime<Utc>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
