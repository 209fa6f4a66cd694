use chrono::{DateTime, Utc};
use course_core::model::{ChapterId, Progress, UserId};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_progress_row};
use crate::repository::{ProgressRepository, ProgressUpsert, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<Progress, StorageError> {
        let video_timestamp = upsert.update.video_timestamp().map(i64::from);
        let quiz_question_index = upsert.update.quiz_question_index().map(i64::from);
        let is_completed = i64::from(upsert.update.is_completed());

        // Targets the partial unique index on live (user_id, chapter_id,
        // content_type) rows, so concurrent saves for the same slot race into
        // one insert plus in-place updates instead of duplicate rows.
        sqlx::query(
            r"
            INSERT INTO progress (
                user_id, chapter_id, content_type, video_timestamp,
                quiz_question_index, is_completed, last_updated
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id, chapter_id, content_type) WHERE deleted_at IS NULL
            DO UPDATE SET
                video_timestamp = excluded.video_timestamp,
                quiz_question_index = excluded.quiz_question_index,
                is_completed = excluded.is_completed,
                last_updated = excluded.last_updated
            ",
        )
        .bind(upsert.user_id.as_str())
        .bind(id_to_i64("chapter_id", upsert.chapter_id.value())?)
        .bind(upsert.update.content_type().as_str())
        .bind(video_timestamp)
        .bind(quiz_question_index)
        .bind(is_completed)
        .bind(upsert.last_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let row = sqlx::query(
            r"
            SELECT
                id, user_id, chapter_id, content_type, video_timestamp,
                quiz_question_index, is_completed, last_updated
            FROM progress
            WHERE user_id = ?1 AND chapter_id = ?2 AND content_type = ?3
              AND deleted_at IS NULL
            ",
        )
        .bind(upsert.user_id.as_str())
        .bind(id_to_i64("chapter_id", upsert.chapter_id.value())?)
        .bind(upsert.update.content_type().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_progress_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn latest_progress(&self, user: &UserId) -> Result<Option<Progress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                id, user_id, chapter_id, content_type, video_timestamp,
                quiz_question_index, is_completed, last_updated
            FROM progress
            WHERE user_id = ?1 AND deleted_at IS NULL
            ORDER BY last_updated DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_progress_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn chapter_progress(
        &self,
        user: &UserId,
        chapter: ChapterId,
    ) -> Result<Vec<Progress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                id, user_id, chapter_id, content_type, video_timestamp,
                quiz_question_index, is_completed, last_updated
            FROM progress
            WHERE user_id = ?1 AND chapter_id = ?2 AND deleted_at IS NULL
            ORDER BY last_updated DESC, id DESC
            ",
        )
        .bind(user.as_str())
        .bind(id_to_i64("chapter_id", chapter.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut progress = Vec::with_capacity(rows.len());
        for row in rows {
            progress.push(map_progress_row(&row)?);
        }
        Ok(progress)
    }

    async fn all_progress(&self, user: &UserId) -> Result<Vec<Progress>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                id, user_id, chapter_id, content_type, video_timestamp,
                quiz_question_index, is_completed, last_updated
            FROM progress
            WHERE user_id = ?1 AND deleted_at IS NULL
            ORDER BY chapter_id ASC, content_type ASC, id ASC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut progress = Vec::with_capacity(rows.len());
        for row in rows {
            progress.push(map_progress_row(&row)?);
        }
        Ok(progress)
    }

    async fn reset_progress(
        &self,
        user: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let res = sqlx::query(
            r"
            UPDATE progress
            SET deleted_at = ?2
            WHERE user_id = ?1 AND deleted_at IS NULL
            ",
        )
        .bind(user.as_str())
        .bind(deleted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected())
    }
}
