use course_core::model::{Chapter, ChapterId, QuestionId, QuizQuestion, Video};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_chapter_row, map_question_row, map_video_row};
use crate::repository::{CatalogRepository, StorageError};

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn upsert_chapter(&self, chapter: &Chapter) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO chapters (id, title, description, order_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                -- keep created_at from the original insert; only update mutable fields
                title = excluded.title,
                description = excluded.description,
                order_index = excluded.order_index,
                deleted_at = NULL
            ",
        )
        .bind(id_to_i64("chapter_id", chapter.id().value())?)
        .bind(chapter.title().to_owned())
        .bind(chapter.description().to_owned())
        .bind(i64::from(chapter.order_index()))
        .bind(chapter.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn upsert_video(&self, video: &Video) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO videos (id, chapter_id, title, video_url, duration_seconds, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                chapter_id = excluded.chapter_id,
                title = excluded.title,
                video_url = excluded.video_url,
                duration_seconds = excluded.duration_seconds,
                deleted_at = NULL
            ",
        )
        .bind(id_to_i64("video_id", video.id().value())?)
        .bind(id_to_i64("chapter_id", video.chapter_id().value())?)
        .bind(video.title().to_owned())
        .bind(video.video_url().to_owned())
        .bind(i64::from(video.duration_seconds()))
        .bind(video.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn upsert_question(&self, question: &QuizQuestion) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_questions (
                id, chapter_id, question_text, option_a, option_b, option_c, option_d,
                correct_answer, order_index, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                chapter_id = excluded.chapter_id,
                question_text = excluded.question_text,
                option_a = excluded.option_a,
                option_b = excluded.option_b,
                option_c = excluded.option_c,
                option_d = excluded.option_d,
                correct_answer = excluded.correct_answer,
                order_index = excluded.order_index,
                deleted_at = NULL
            ",
        )
        .bind(id_to_i64("question_id", question.id().value())?)
        .bind(id_to_i64("chapter_id", question.chapter_id().value())?)
        .bind(question.question_text().to_owned())
        .bind(question.option_a().to_owned())
        .bind(question.option_b().to_owned())
        .bind(question.option_c().to_owned())
        .bind(question.option_d().to_owned())
        .bind(question.correct_answer().as_str())
        .bind(i64::from(question.order_index()))
        .bind(question.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn list_chapters(&self) -> Result<Vec<Chapter>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, order_index, created_at
            FROM chapters
            WHERE deleted_at IS NULL
            ORDER BY order_index ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut chapters = Vec::with_capacity(rows.len());
        for row in rows {
            chapters.push(map_chapter_row(&row)?);
        }
        Ok(chapters)
    }

    async fn get_chapter(&self, id: ChapterId) -> Result<Option<Chapter>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, order_index, created_at
            FROM chapters
            WHERE id = ?1 AND deleted_at IS NULL
            ",
        )
        .bind(id_to_i64("chapter_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_chapter_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn video_for_chapter(&self, chapter: ChapterId) -> Result<Option<Video>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, chapter_id, title, video_url, duration_seconds, created_at
            FROM videos
            WHERE chapter_id = ?1 AND deleted_at IS NULL
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(id_to_i64("chapter_id", chapter.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_video_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn questions_for_chapter(
        &self,
        chapter: ChapterId,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                id, chapter_id, question_text, option_a, option_b, option_c, option_d,
                correct_answer, order_index, created_at
            FROM quiz_questions
            WHERE chapter_id = ?1 AND deleted_at IS NULL
            ORDER BY order_index ASC, id ASC
            ",
        )
        .bind(id_to_i64("chapter_id", chapter.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                id, chapter_id, question_text, option_a, option_b, option_c, option_d,
                correct_answer, order_index, created_at
            FROM quiz_questions
            WHERE id = ?1 AND deleted_at IS NULL
            ",
        )
        .bind(id_to_i64("question_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_question_row(&row).map(Some),
            None => Ok(None),
        }
    }
}
