use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use course_core::model::{ChapterId, ContentType, Progress, ProgressUpdate, UserId};
use storage::repository::{CatalogRepository, ProgressRepository, ProgressUpsert, UserRepository};

use crate::Clock;
use crate::error::ProgressServiceError;

//
// ─── REQUEST & VIEW TYPES ──────────────────────────────────────────────────────
//

/// Raw payload of a progress save, as received from the client.
///
/// `content_type` stays a string until the service validates it, so a bad
/// value produces the parse error's message instead of a deserializer's.
#[derive(Debug, Clone)]
pub struct SaveProgressRequest {
    pub user_id: String,
    pub chapter_id: ChapterId,
    pub content_type: String,
    pub video_timestamp: Option<u32>,
    pub quiz_question_index: Option<u32>,
    pub is_completed: bool,
}

/// The "where was I" summary: a user's most recent progress row joined with
/// its chapter title. All fields except `has_progress` are absent when the
/// user has never saved progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProgressSummary {
    pub has_progress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_chapter_id: Option<ChapterId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_video_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_quiz_question: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl UserProgressSummary {
    /// Summary for a user with no saved progress.
    #[must_use]
    pub fn none() -> Self {
        Self {
            has_progress: false,
            last_chapter_id: None,
            last_content_type: None,
            last_video_time: None,
            last_quiz_question: None,
            chapter_title: None,
            last_updated: None,
        }
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Saves and reads per-user progress.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    catalog: Arc<dyn CatalogRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        catalog: Arc<dyn CatalogRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            users,
            catalog,
            progress,
        }
    }

    /// Validate and store a progress save, replacing the live row for the
    /// (user, chapter, content type) slot if one exists.
    ///
    /// The validation order is observable through the returned message and is
    /// kept stable: content type, position pairing, user id, then user and
    /// chapter existence.
    ///
    /// # Errors
    ///
    /// Returns the wrapped validation error for a bad content type, a missing
    /// position field or an empty user id; `UserNotFound` / `ChapterNotFound`
    /// for dangling references; `Storage` if persistence fails.
    pub async fn save_progress(
        &self,
        request: SaveProgressRequest,
    ) -> Result<Progress, ProgressServiceError> {
        let content_type: ContentType = request.content_type.parse()?;
        let update = ProgressUpdate::new(
            content_type,
            request.video_timestamp,
            request.quiz_question_index,
            request.is_completed,
        )?;
        let user_id = UserId::new(request.user_id)?;

        self.users
            .find_user(&user_id)
            .await?
            .ok_or(ProgressServiceError::UserNotFound)?;
        self.catalog
            .get_chapter(request.chapter_id)
            .await?
            .ok_or(ProgressServiceError::ChapterNotFound)?;

        let upsert = ProgressUpsert {
            user_id,
            chapter_id: request.chapter_id,
            update,
            last_updated: self.clock.now(),
        };
        let stored = self.progress.upsert_progress(&upsert).await?;
        Ok(stored)
    }

    /// The user's most recent progress row joined with its chapter title.
    ///
    /// Returns the empty summary when the user has never saved progress; an
    /// unknown user id behaves the same way. The chapter title is omitted if
    /// the chapter has since been removed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UserId` for an empty id and `Storage`
    /// if repository access fails.
    pub async fn latest_progress(
        &self,
        user_id: &str,
    ) -> Result<UserProgressSummary, ProgressServiceError> {
        let user_id = UserId::new(user_id)?;
        let Some(row) = self.progress.latest_progress(&user_id).await? else {
            return Ok(UserProgressSummary::none());
        };
        let chapter = self.catalog.get_chapter(row.chapter_id).await?;
        Ok(UserProgressSummary {
            has_progress: true,
            last_chapter_id: Some(row.chapter_id),
            last_content_type: Some(row.content_type),
            last_video_time: row.video_timestamp,
            last_quiz_question: row.quiz_question_index,
            chapter_title: chapter.map(|c| c.title().to_string()),
            last_updated: Some(row.last_updated),
        })
    }

    /// Live progress rows for one chapter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UserId` for an empty id and `Storage`
    /// if repository access fails.
    pub async fn chapter_progress(
        &self,
        user_id: &str,
        chapter: ChapterId,
    ) -> Result<Vec<Progress>, ProgressServiceError> {
        let user_id = UserId::new(user_id)?;
        let rows = self.progress.chapter_progress(&user_id, chapter).await?;
        Ok(rows)
    }

    /// All live progress rows for the user, ordered by chapter then content
    /// type.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UserId` for an empty id and `Storage`
    /// if repository access fails.
    pub async fn all_progress(&self, user_id: &str) -> Result<Vec<Progress>, ProgressServiceError> {
        let user_id = UserId::new(user_id)?;
        let rows = self.progress.all_progress(&user_id).await?;
        Ok(rows)
    }

    /// Soft-delete the user's progress rows; returns how many went away.
    /// Calling again right away returns 0.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UserId` for an empty id and `Storage`
    /// if the write fails.
    pub async fn reset_progress(&self, user_id: &str) -> Result<u64, ProgressServiceError> {
        let user_id = UserId::new(user_id)?;
        let deleted = self
            .progress
            .reset_progress(&user_id, self.clock.now())
            .await?;
        Ok(deleted)
    }
}
