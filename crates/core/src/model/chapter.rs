use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{ChapterId, VideoId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChapterError {
    #[error("chapter title cannot be empty")]
    EmptyTitle,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VideoError {
    #[error("video title cannot be empty")]
    EmptyTitle,

    #[error("video URL cannot be empty")]
    EmptyUrl,
}

//
// ─── CHAPTER ───────────────────────────────────────────────────────────────────
//

/// A chapter in the course outline.
///
/// Chapters are ordered by `order_index` and carry at most one video plus a
/// set of quiz questions (stored separately).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    id: ChapterId,
    title: String,
    description: String,
    order_index: u32,
    created_at: DateTime<Utc>,
}

impl Chapter {
    /// Creates a chapter with a validated, trimmed title.
    ///
    /// # Errors
    ///
    /// Returns `ChapterError::EmptyTitle` if the title is empty after trimming.
    pub fn new(
        id: ChapterId,
        title: impl Into<String>,
        description: impl Into<String>,
        order_index: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ChapterError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ChapterError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            description: description.into().trim().to_string(),
            order_index,
            created_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ChapterId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Position of the chapter in the course outline (1-based in seed data).
    #[must_use]
    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── VIDEO ─────────────────────────────────────────────────────────────────────
//

/// The lecture video attached to a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    id: VideoId,
    chapter_id: ChapterId,
    title: String,
    video_url: String,
    duration_seconds: u32,
    created_at: DateTime<Utc>,
}

impl Video {
    /// Creates a video with validated title and URL.
    ///
    /// # Errors
    ///
    /// Returns `VideoError` if title or URL are empty after trimming.
    pub fn new(
        id: VideoId,
        chapter_id: ChapterId,
        title: impl Into<String>,
        video_url: impl Into<String>,
        duration_seconds: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, VideoError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(VideoError::EmptyTitle);
        }
        let video_url = video_url.into().trim().to_string();
        if video_url.is_empty() {
            return Err(VideoError::EmptyUrl);
        }
        Ok(Self {
            id,
            chapter_id,
            title,
            video_url,
            duration_seconds,
            created_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> VideoId {
        self.id
    }

    #[must_use]
    pub fn chapter_id(&self) -> ChapterId {
        self.chapter_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
