use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::content_service::ContentService;
use crate::progress_service::ProgressService;
use crate::quiz_service::QuizService;
use crate::resume_service::ResumeService;
use crate::user_service::UserService;

/// Assembles the request-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    content: Arc<ContentService>,
    users: Arc<UserService>,
    progress: Arc<ProgressService>,
    quiz: Arc<QuizService>,
    resume: Arc<ResumeService>,
}

impl AppServices {
    /// Wire services over an already constructed storage backend.
    ///
    /// The server binary hands in `SQLite` storage; tests hand in an
    /// in-memory `Storage` after seeding it.
    #[must_use]
    pub fn with_storage(storage: &Storage, clock: Clock) -> Self {
        let content = Arc::new(ContentService::new(Arc::clone(&storage.catalog)));
        let users = Arc::new(UserService::new(clock, Arc::clone(&storage.users)));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.users),
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.progress),
        ));
        let quiz = Arc::new(QuizService::new(
            clock,
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.answers),
        ));
        let resume = Arc::new(ResumeService::new(
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.answers),
        ));

        Self {
            content,
            users,
            progress,
            quiz,
            resume,
        }
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn resume(&self) -> Arc<ResumeService> {
        Arc::clone(&self.resume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use course_core::model::{Chapter, ChapterId};
    use course_core::time::{fixed_clock, fixed_now};

    #[tokio::test]
    async fn services_share_one_backend() {
        let storage = Storage::in_memory();
        let chapter = Chapter::new(ChapterId::new(1), "Intro", "", 1, fixed_now()).unwrap();
        storage.catalog.upsert_chapter(&chapter).await.unwrap();

        let services = AppServices::with_storage(&storage, fixed_clock());
        services.users().login("u1").await.unwrap();

        // A user created through one service is visible to another.
        let saved = services
            .progress()
            .save_progress(crate::progress_service::SaveProgressRequest {
                user_id: "u1".to_string(),
                chapter_id: ChapterId::new(1),
                content_type: "video".to_string(),
                video_timestamp: Some(30),
                quiz_question_index: None,
                is_completed: false,
            })
            .await
            .unwrap();
        assert_eq!(saved.chapter_id, ChapterId::new(1));

        let summary = services.progress().latest_progress("u1").await.unwrap();
        assert_eq!(summary.chapter_title.as_deref(), Some("Intro"));
    }
}
