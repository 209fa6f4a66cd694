use std::sync::Arc;

use serde::Serialize;

use course_core::model::{Chapter, ChapterId, QuizQuestion, Video};
use storage::repository::CatalogRepository;

use crate::error::ContentServiceError;

/// Read side of the course catalog.
///
/// The catalog is written by the seed binary only; request handlers come
/// through these lookups.
#[derive(Clone)]
pub struct ContentService {
    catalog: Arc<dyn CatalogRepository>,
}

/// A chapter bundled with its video and quiz for a single response.
///
/// The chapter fields are flattened into the bundle; a missing video and an
/// empty quiz are simply omitted rather than reported as errors.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterContent {
    #[serde(flatten)]
    pub chapter: Chapter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quiz_questions: Vec<QuizQuestion>,
}

impl ContentService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// All live chapters in outline order.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::Storage` if repository access fails.
    pub async fn list_chapters(&self) -> Result<Vec<Chapter>, ContentServiceError> {
        let chapters = self.catalog.list_chapters().await?;
        Ok(chapters)
    }

    /// Fetch one chapter by id.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::ChapterNotFound` if no live chapter has
    /// this id. Returns `ContentServiceError::Storage` if repository access
    /// fails.
    pub async fn get_chapter(&self, id: ChapterId) -> Result<Chapter, ContentServiceError> {
        self.catalog
            .get_chapter(id)
            .await?
            .ok_or(ContentServiceError::ChapterNotFound)
    }

    /// The chapter's video.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::VideoNotFound` if the chapter has no live
    /// video. Returns `ContentServiceError::Storage` if repository access
    /// fails.
    pub async fn chapter_video(&self, chapter: ChapterId) -> Result<Video, ContentServiceError> {
        self.catalog
            .video_for_chapter(chapter)
            .await?
            .ok_or(ContentServiceError::VideoNotFound)
    }

    /// The chapter's quiz in question order.
    ///
    /// The lookup is keyed on the questions alone; an unknown chapter id and a
    /// chapter without questions are indistinguishable here.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::NoQuizQuestions` if the chapter has no
    /// live questions. Returns `ContentServiceError::Storage` if repository
    /// access fails.
    pub async fn chapter_quiz(
        &self,
        chapter: ChapterId,
    ) -> Result<Vec<QuizQuestion>, ContentServiceError> {
        let questions = self.catalog.questions_for_chapter(chapter).await?;
        if questions.is_empty() {
            return Err(ContentServiceError::NoQuizQuestions);
        }
        Ok(questions)
    }

    /// A chapter together with its video and quiz.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::ChapterNotFound` if the chapter is
    /// absent. Returns `ContentServiceError::Storage` if repository access
    /// fails.
    pub async fn chapter_content(
        &self,
        chapter: ChapterId,
    ) -> Result<ChapterContent, ContentServiceError> {
        let chapter = self.get_chapter(chapter).await?;
        let video = self.catalog.video_for_chapter(chapter.id()).await?;
        let quiz_questions = self.catalog.questions_for_chapter(chapter.id()).await?;
        Ok(ChapterContent {
            chapter,
            video,
            quiz_questions,
        })
    }
}
