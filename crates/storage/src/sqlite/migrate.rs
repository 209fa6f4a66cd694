use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema (catalog tables, users, progress, the quiz answer
/// ledger, and indexes). Every user-owned table carries a `deleted_at`
/// column; resets and clears mark rows instead of removing them, and the
/// uniqueness rules below apply to live rows only.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS chapters (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    order_index INTEGER NOT NULL CHECK (order_index >= 0),
                    created_at TEXT NOT NULL,
                    deleted_at TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS videos (
                    id INTEGER PRIMARY KEY,
                    chapter_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    video_url TEXT NOT NULL,
                    duration_seconds INTEGER NOT NULL CHECK (duration_seconds >= 0),
                    created_at TEXT NOT NULL,
                    deleted_at TEXT,
                    FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_questions (
                    id INTEGER PRIMARY KEY,
                    chapter_id INTEGER NOT NULL,
                    question_text TEXT NOT NULL,
                    option_a TEXT NOT NULL,
                    option_b TEXT NOT NULL,
                    option_c TEXT NOT NULL,
                    option_d TEXT NOT NULL,
                    correct_answer TEXT NOT NULL CHECK (correct_answer IN ('A', 'B', 'C', 'D')),
                    order_index INTEGER NOT NULL CHECK (order_index >= 0),
                    created_at TEXT NOT NULL,
                    deleted_at TEXT,
                    FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    username TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    deleted_at TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // Progress rows reference users by their external id so a user row
        // can be soft-deleted without cascading into history.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    chapter_id INTEGER NOT NULL,
                    content_type TEXT NOT NULL CHECK (content_type IN ('video', 'quiz')),
                    video_timestamp INTEGER CHECK (video_timestamp >= 0),
                    quiz_question_index INTEGER CHECK (quiz_question_index >= 0),
                    is_completed INTEGER NOT NULL CHECK (is_completed IN (0, 1)),
                    last_updated TEXT NOT NULL,
                    deleted_at TEXT,
                    FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_answers (
                    id INTEGER PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    chapter_id INTEGER NOT NULL,
                    question_id INTEGER NOT NULL,
                    user_answer TEXT NOT NULL CHECK (user_answer IN ('A', 'B', 'C', 'D')),
                    is_correct INTEGER NOT NULL CHECK (is_correct IN (0, 1)),
                    answered_at TEXT NOT NULL,
                    deleted_at TEXT,
                    FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE,
                    FOREIGN KEY (question_id) REFERENCES quiz_questions(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // One live user row per external id; soft-deleted rows do not block
        // re-registration.
        sqlx::query(
            r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_users_live_user_id
                    ON users (user_id) WHERE deleted_at IS NULL;
            ",
        )
        .execute(&mut *tx)
        .await?;

        // One live progress row per (user, chapter, content type). The
        // upsert in the progress repository targets this index, which makes
        // concurrent saves for the same slot collapse onto a single row.
        sqlx::query(
            r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_progress_live_slot
                    ON progress (user_id, chapter_id, content_type)
                    WHERE deleted_at IS NULL;
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_videos_chapter
                    ON videos (chapter_id, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_questions_chapter_order
                    ON quiz_questions (chapter_id, order_index, id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_user_updated
                    ON progress (user_id, last_updated);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_answers_user_chapter_answered
                    ON quiz_answers (user_id, chapter_id, answered_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_answers_user_question_answered
                    ON quiz_answers (user_id, question_id, answered_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
