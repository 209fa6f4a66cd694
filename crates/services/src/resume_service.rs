use std::sync::Arc;

use serde::Serialize;

use course_core::model::{ChapterId, QuestionId, UserId};
use course_core::quiz::{ChapterQuizStatus, chapter_quiz_status, resume_target};
use storage::repository::{AnswerRepository, CatalogRepository};

use crate::error::ResumeServiceError;

/// Where to pick a quiz back up: the first question with no attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumePoint {
    pub question_id: QuestionId,
    pub order_index: u32,
    pub question_text: String,
}

/// Resume state for one (user, chapter) pair.
///
/// `completed` means every question has at least one attempt; a wrong attempt
/// still counts. A chapter with no questions reports completed as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResume {
    pub completed: bool,
    pub resume_point: Option<ResumePoint>,
}

/// Read-only quiz state: the merged quiz-with-history view and the resume
/// point. Both are derived fresh from the catalog and the ledger on every
/// call; nothing is cached or stored.
#[derive(Clone)]
pub struct ResumeService {
    catalog: Arc<dyn CatalogRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl ResumeService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>, answers: Arc<dyn AnswerRepository>) -> Self {
        Self { catalog, answers }
    }

    /// The chapter's quiz merged with one user's attempt history.
    ///
    /// Each question carries its latest attempt and attempt count; the
    /// solution is revealed only for answered questions.
    ///
    /// # Errors
    ///
    /// Returns `ResumeServiceError::ChapterNotFound` if the chapter is
    /// absent, `NoQuizQuestions` if it has no quiz, `UserId` for an empty
    /// id, and `Storage` if repository access fails.
    pub async fn quiz_with_history(
        &self,
        chapter: ChapterId,
        user_id: &str,
    ) -> Result<ChapterQuizStatus, ResumeServiceError> {
        let user_id = UserId::new(user_id)?;
        let chapter = self
            .catalog
            .get_chapter(chapter)
            .await?
            .ok_or(ResumeServiceError::ChapterNotFound)?;
        let questions = self.catalog.questions_for_chapter(chapter.id()).await?;
        if questions.is_empty() {
            return Err(ResumeServiceError::NoQuizQuestions);
        }
        let answers = self
            .answers
            .answers_for_chapter(&user_id, chapter.id())
            .await?;
        Ok(chapter_quiz_status(
            chapter.id(),
            chapter.title(),
            &questions,
            &answers,
        ))
    }

    /// The first question in quiz order with no recorded attempt.
    ///
    /// The chapter itself is not checked; an unknown chapter id simply has no
    /// questions and reports completed.
    ///
    /// # Errors
    ///
    /// Returns `ResumeServiceError::UserId` for an empty id and `Storage` if
    /// repository access fails.
    pub async fn resume_point(
        &self,
        user_id: &str,
        chapter: ChapterId,
    ) -> Result<QuizResume, ResumeServiceError> {
        let user_id = UserId::new(user_id)?;
        let questions = self.catalog.questions_for_chapter(chapter).await?;
        let answers = self.answers.answers_for_chapter(&user_id, chapter).await?;

        let resume_point = resume_target(&questions, &answers).map(|q| ResumePoint {
            question_id: q.id(),
            order_index: q.order_index(),
            question_text: q.question_text().to_string(),
        });
        Ok(QuizResume {
            completed: resume_point.is_none(),
            resume_point,
        })
    }
}
