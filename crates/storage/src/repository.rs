use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{
    AnswerOption, Chapter, ChapterId, Progress, ProgressUpdate, QuestionId, QuizAnswer,
    QuizQuestion, User, UserId, Video, VideoId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── WRITE SHAPES ──────────────────────────────────────────────────────────────
//

/// Insert shape for a user row created lazily on first login.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Write shape for the progress upsert.
///
/// The repository inserts a new row or replaces the mutable fields of the
/// existing live row for (user, chapter, content type) in one atomic step;
/// callers never read-modify-write.
#[derive(Debug, Clone)]
pub struct ProgressUpsert {
    pub user_id: UserId,
    pub chapter_id: ChapterId,
    pub update: ProgressUpdate,
    pub last_updated: DateTime<Utc>,
}

/// Insert shape for one quiz answer ledger row.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub user_id: UserId,
    pub chapter_id: ChapterId,
    pub question_id: QuestionId,
    pub user_answer: AnswerOption,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Repository contract for the course catalog (chapters, videos, questions).
///
/// Reads exclude soft-deleted rows. The upserts exist for the seed binary and
/// test fixtures; no request path writes to the catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Persist or update a chapter by its explicit id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the chapter cannot be stored.
    async fn upsert_chapter(&self, chapter: &Chapter) -> Result<(), StorageError>;

    /// Persist or update a video by its explicit id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the video cannot be stored.
    async fn upsert_video(&self, video: &Video) -> Result<(), StorageError>;

    /// Persist or update a quiz question by its explicit id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &QuizQuestion) -> Result<(), StorageError>;

    /// All live chapters ordered by `order_index`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn list_chapters(&self) -> Result<Vec<Chapter>, StorageError>;

    /// Fetch a live chapter by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn get_chapter(&self, id: ChapterId) -> Result<Option<Chapter>, StorageError>;

    /// The chapter's video. When several exist the lowest id wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn video_for_chapter(&self, chapter: ChapterId) -> Result<Option<Video>, StorageError>;

    /// Live questions for a chapter ordered by `order_index`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn questions_for_chapter(
        &self,
        chapter: ChapterId,
    ) -> Result<Vec<QuizQuestion>, StorageError>;

    /// Fetch a live question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError>;
}

/// Repository contract for user rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return the live user with the given external id, creating it first if
    /// absent. Concurrent calls for the same id converge on one row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be created or read.
    async fn get_or_create_user(&self, new_user: &NewUser) -> Result<User, StorageError>;

    /// Fetch a live user by external id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, StorageError>;
}

/// Repository contract for progress rows.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Insert or fully replace the live row for (user, chapter, content type)
    /// and return the stored state. Atomic: concurrent saves for the same key
    /// collapse onto one row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be written or read back.
    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<Progress, StorageError>;

    /// The user's most recently updated live row, if any.
    /// Ties on `last_updated` resolve to the highest row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn latest_progress(&self, user: &UserId) -> Result<Option<Progress>, StorageError>;

    /// Live rows for one chapter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn chapter_progress(
        &self,
        user: &UserId,
        chapter: ChapterId,
    ) -> Result<Vec<Progress>, StorageError>;

    /// All live rows for the user, ordered by chapter then content type.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn all_progress(&self, user: &UserId) -> Result<Vec<Progress>, StorageError>;

    /// Soft-delete every live row for the user; returns the count.
    /// A second call is a no-op returning 0.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on write failure.
    async fn reset_progress(
        &self,
        user: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StorageError>;
}

/// Repository contract for the append-only quiz answer ledger.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Append one ledger row and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn append_answer(&self, answer: &NewAnswer) -> Result<QuizAnswer, StorageError>;

    /// Live answers for one chapter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn answers_for_chapter(
        &self,
        user: &UserId,
        chapter: ChapterId,
    ) -> Result<Vec<QuizAnswer>, StorageError>;

    /// All live answers for the user, ordered by chapter then newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn answers_for_user(&self, user: &UserId) -> Result<Vec<QuizAnswer>, StorageError>;

    /// Live answers for one question, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on query failure.
    async fn answers_for_question(
        &self,
        user: &UserId,
        question: QuestionId,
    ) -> Result<Vec<QuizAnswer>, StorageError>;

    /// Soft-delete the user's live answers, optionally scoped to a chapter;
    /// returns the count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on write failure.
    async fn clear_answers(
        &self,
        user: &UserId,
        chapter: Option<ChapterId>,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StoredProgress {
    row: Progress,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct StoredAnswer {
    row: QuizAnswer,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    chapters: HashMap<ChapterId, Chapter>,
    videos: HashMap<VideoId, Video>,
    questions: HashMap<QuestionId, QuizQuestion>,
    users: Vec<User>,
    progress: Vec<StoredProgress>,
    answers: Vec<StoredAnswer>,
    next_user_id: i64,
    next_progress_id: i64,
    next_answer_id: i64,
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Progress and answer rows keep a `deleted_at` marker so soft-delete
/// semantics (reset/clear counts, re-saves after a reset) behave like the
/// `SQLite` backend. All operations run under one mutex, which also makes the
/// progress upsert atomic.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn upsert_chapter(&self, chapter: &Chapter) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.chapters.insert(chapter.id(), chapter.clone());
        Ok(())
    }

    async fn upsert_video(&self, video: &Video) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.videos.insert(video.id(), video.clone());
        Ok(())
    }

    async fn upsert_question(&self, question: &QuizQuestion) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.questions.insert(question.id(), question.clone());
        Ok(())
    }

    async fn list_chapters(&self) -> Result<Vec<Chapter>, StorageError> {
        let state = self.lock()?;
        let mut chapters: Vec<Chapter> = state.chapters.values().cloned().collect();
        chapters.sort_by_key(|c| (c.order_index(), c.id()));
        Ok(chapters)
    }

    async fn get_chapter(&self, id: ChapterId) -> Result<Option<Chapter>, StorageError> {
        let state = self.lock()?;
        Ok(state.chapters.get(&id).cloned())
    }

    async fn video_for_chapter(&self, chapter: ChapterId) -> Result<Option<Video>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .videos
            .values()
            .filter(|v| v.chapter_id() == chapter)
            .min_by_key(|v| v.id())
            .cloned())
    }

    async fn questions_for_chapter(
        &self,
        chapter: ChapterId,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        let state = self.lock()?;
        let mut questions: Vec<QuizQuestion> = state
            .questions
            .values()
            .filter(|q| q.chapter_id() == chapter)
            .cloned()
            .collect();
        questions.sort_by_key(|q| (q.order_index(), q.id()));
        Ok(questions)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError> {
        let state = self.lock()?;
        Ok(state.questions.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_or_create_user(&self, new_user: &NewUser) -> Result<User, StorageError> {
        let mut state = self.lock()?;
        if let Some(existing) = state.users.iter().find(|u| u.user_id == new_user.user_id) {
            return Ok(existing.clone());
        }
        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            user_id: new_user.user_id.clone(),
            username: new_user.username.clone(),
            created_at: new_user.created_at,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, StorageError> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| &u.user_id == user_id).cloned())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<Progress, StorageError> {
        let mut state = self.lock()?;
        let content_type = upsert.update.content_type();

        if let Some(existing) = state.progress.iter_mut().find(|p| {
            p.deleted_at.is_none()
                && p.row.user_id == upsert.user_id
                && p.row.chapter_id == upsert.chapter_id
                && p.row.content_type == content_type
        }) {
            existing.row.video_timestamp = upsert.update.video_timestamp();
            existing.row.quiz_question_index = upsert.update.quiz_question_index();
            existing.row.is_completed = upsert.update.is_completed();
            existing.row.last_updated = upsert.last_updated;
            return Ok(existing.row.clone());
        }

        state.next_progress_id += 1;
        let row = Progress {
            id: state.next_progress_id,
            user_id: upsert.user_id.clone(),
            chapter_id: upsert.chapter_id,
            content_type,
            video_timestamp: upsert.update.video_timestamp(),
            quiz_question_index: upsert.update.quiz_question_index(),
            is_completed: upsert.update.is_completed(),
            last_updated: upsert.last_updated,
        };
        state.progress.push(StoredProgress {
            row: row.clone(),
            deleted_at: None,
        });
        Ok(row)
    }

    async fn latest_progress(&self, user: &UserId) -> Result<Option<Progress>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .progress
            .iter()
            .filter(|p| p.deleted_at.is_none() && &p.row.user_id == user)
            .max_by_key(|p| (p.row.last_updated, p.row.id))
            .map(|p| p.row.clone()))
    }

    async fn chapter_progress(
        &self,
        user: &UserId,
        chapter: ChapterId,
    ) -> Result<Vec<Progress>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<Progress> = state
            .progress
            .iter()
            .filter(|p| {
                p.deleted_at.is_none() && &p.row.user_id == user && p.row.chapter_id == chapter
            })
            .map(|p| p.row.clone())
            .collect();
        rows.sort_by(|a, b| (b.last_updated, b.id).cmp(&(a.last_updated, a.id)));
        Ok(rows)
    }

    async fn all_progress(&self, user: &UserId) -> Result<Vec<Progress>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<Progress> = state
            .progress
            .iter()
            .filter(|p| p.deleted_at.is_none() && &p.row.user_id == user)
            .map(|p| p.row.clone())
            .collect();
        // content type sorts by its storage string, matching the SQL backend.
        rows.sort_by_key(|r| (r.chapter_id, r.content_type.as_str(), r.id));
        Ok(rows)
    }

    async fn reset_progress(
        &self,
        user: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut state = self.lock()?;
        let mut deleted = 0u64;
        for entry in state
            .progress
            .iter_mut()
            .filter(|p| p.deleted_at.is_none() && &p.row.user_id == user)
        {
            entry.deleted_at = Some(deleted_at);
            deleted += 1;
        }
        Ok(deleted)
    }
}

#[async_trait]
impl AnswerRepository for InMemoryRepository {
    async fn append_answer(&self, answer: &NewAnswer) -> Result<QuizAnswer, StorageError> {
        let mut state = self.lock()?;
        state.next_answer_id += 1;
        let row = QuizAnswer {
            id: state.next_answer_id,
            user_id: answer.user_id.clone(),
            chapter_id: answer.chapter_id,
            question_id: answer.question_id,
            user_answer: answer.user_answer,
            is_correct: answer.is_correct,
            answered_at: answer.answered_at,
        };
        state.answers.push(StoredAnswer {
            row: row.clone(),
            deleted_at: None,
        });
        Ok(row)
    }

    async fn answers_for_chapter(
        &self,
        user: &UserId,
        chapter: ChapterId,
    ) -> Result<Vec<QuizAnswer>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<QuizAnswer> = state
            .answers
            .iter()
            .filter(|a| {
                a.deleted_at.is_none() && &a.row.user_id == user && a.row.chapter_id == chapter
            })
            .map(|a| a.row.clone())
            .collect();
        rows.sort_by(|a, b| (b.answered_at, b.id).cmp(&(a.answered_at, a.id)));
        Ok(rows)
    }

    async fn answers_for_user(&self, user: &UserId) -> Result<Vec<QuizAnswer>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<QuizAnswer> = state
            .answers
            .iter()
            .filter(|a| a.deleted_at.is_none() && &a.row.user_id == user)
            .map(|a| a.row.clone())
            .collect();
        rows.sort_by(|a, b| {
            a.chapter_id
                .cmp(&b.chapter_id)
                .then((b.answered_at, b.id).cmp(&(a.answered_at, a.id)))
        });
        Ok(rows)
    }

    async fn answers_for_question(
        &self,
        user: &UserId,
        question: QuestionId,
    ) -> Result<Vec<QuizAnswer>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<QuizAnswer> = state
            .answers
            .iter()
            .filter(|a| {
                a.deleted_at.is_none() && &a.row.user_id == user && a.row.question_id == question
            })
            .map(|a| a.row.clone())
            .collect();
        rows.sort_by(|a, b| (b.answered_at, b.id).cmp(&(a.answered_at, a.id)));
        Ok(rows)
    }

    async fn clear_answers(
        &self,
        user: &UserId,
        chapter: Option<ChapterId>,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut state = self.lock()?;
        let mut deleted = 0u64;
        for entry in state.answers.iter_mut().filter(|a| {
            a.deleted_at.is_none()
                && &a.row.user_id == user
                && chapter.is_none_or(|c| a.row.chapter_id == c)
        }) {
            entry.deleted_at = Some(deleted_at);
            deleted += 1;
        }
        Ok(deleted)
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogRepository>,
    pub users: Arc<dyn UserRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub answers: Arc<dyn AnswerRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo.clone());
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let answers: Arc<dyn AnswerRepository> = Arc::new(repo);
        Self {
            catalog,
            users,
            progress,
            answers,
        }
    }
}
