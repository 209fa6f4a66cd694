use chrono::{DateTime, Utc};
use course_core::model::{ChapterId, QuestionId, QuizAnswer, UserId};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_answer_row};
use crate::repository::{AnswerRepository, NewAnswer, StorageError};

#[async_trait::async_trait]
impl AnswerRepository for SqliteRepository {
    async fn append_answer(&self, answer: &NewAnswer) -> Result<QuizAnswer, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO quiz_answers (
                user_id, chapter_id, question_id, user_answer, is_correct, answered_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(answer.user_id.as_str())
        .bind(id_to_i64("chapter_id", answer.chapter_id.value())?)
        .bind(id_to_i64("question_id", answer.question_id.value())?)
        .bind(answer.user_answer.as_str())
        .bind(i64::from(answer.is_correct))
        .bind(answer.answered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(QuizAnswer {
            id: res.last_insert_rowid(),
            user_id: answer.user_id.clone(),
            chapter_id: answer.chapter_id,
            question_id: answer.question_id,
            user_answer: answer.user_answer,
            is_correct: answer.is_correct,
            answered_at: answer.answered_at,
        })
    }

    async fn answers_for_chapter(
        &self,
        user: &UserId,
        chapter: ChapterId,
    ) -> Result<Vec<QuizAnswer>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, chapter_id, question_id, user_answer, is_correct, answered_at
            FROM quiz_answers
            WHERE user_id = ?1 AND chapter_id = ?2 AND deleted_at IS NULL
            ORDER BY answered_at DESC, id DESC
            ",
        )
        .bind(user.as_str())
        .bind(id_to_i64("chapter_id", chapter.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut answers = Vec::with_capacity(rows.len());
        for row in rows {
            answers.push(map_answer_row(&row)?);
        }
        Ok(answers)
    }

    async fn answers_for_user(&self, user: &UserId) -> Result<Vec<QuizAnswer>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, chapter_id, question_id, user_answer, is_correct, answered_at
            FROM quiz_answers
            WHERE user_id = ?1 AND deleted_at IS NULL
            ORDER BY chapter_id ASC, answered_at DESC, id DESC
            ",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut answers = Vec::with_capacity(rows.len());
        for row in rows {
            answers.push(map_answer_row(&row)?);
        }
        Ok(answers)
    }

    async fn answers_for_question(
        &self,
        user: &UserId,
        question: QuestionId,
    ) -> Result<Vec<QuizAnswer>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, chapter_id, question_id, user_answer, is_correct, answered_at
            FROM quiz_answers
            WHERE user_id = ?1 AND question_id = ?2 AND deleted_at IS NULL
            ORDER BY answered_at DESC, id DESC
            ",
        )
        .bind(user.as_str())
        .bind(id_to_i64("question_id", question.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut answers = Vec::with_capacity(rows.len());
        for row in rows {
            answers.push(map_answer_row(&row)?);
        }
        Ok(answers)
    }

    async fn clear_answers(
        &self,
        user: &UserId,
        chapter: Option<ChapterId>,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let res = match chapter {
            Some(chapter) => {
                sqlx::query(
                    r"
                    UPDATE quiz_answers
                    SET deleted_at = ?3
                    WHERE user_id = ?1 AND chapter_id = ?2 AND deleted_at IS NULL
                    ",
                )
                .bind(user.as_str())
                .bind(id_to_i64("chapter_id", chapter.value())?)
                .bind(deleted_at)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    UPDATE quiz_answers
                    SET deleted_at = ?2
                    WHERE user_id = ?1 AND deleted_at IS NULL
                    ",
                )
                .bind(user.as_str())
                .bind(deleted_at)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected())
    }
}
