use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use course_core::model::{
    AnswerOption, ChapterId, QuestionId, QuizAnswer, QuizQuestion, UserId,
};
use course_core::quiz::ChapterScore;
use storage::repository::{AnswerRepository, CatalogRepository, NewAnswer};

use crate::Clock;
use crate::error::QuizServiceError;

//
// ─── REQUEST & VIEW TYPES ──────────────────────────────────────────────────────
//

/// Raw payload of an answer submission.
///
/// `user_answer` stays a string until the service validates it, so a bad
/// letter produces the parse error's message.
#[derive(Debug, Clone)]
pub struct SubmitAnswerRequest {
    pub user_id: String,
    pub chapter_id: ChapterId,
    pub question_id: QuestionId,
    pub user_answer: String,
}

/// The outcome of a submission: the stored ledger row plus the solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedAnswer {
    pub answer: QuizAnswer,
    pub correct_answer: AnswerOption,
}

/// A ledger row enriched with its question's text and solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerDetail {
    #[serde(flatten)]
    pub answer: QuizAnswer,
    pub question_text: String,
    pub correct_answer: AnswerOption,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Grades submissions and reads the append-only answer ledger.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    catalog: Arc<dyn CatalogRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn CatalogRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            answers,
        }
    }

    /// Grade a submission against the stored solution and append it to the
    /// ledger. Never replaces an earlier attempt; submitting the same
    /// question N times leaves N rows.
    ///
    /// The question must live under the chapter named in the request.
    ///
    /// # Errors
    ///
    /// Returns the wrapped validation error for a bad answer letter or empty
    /// user id, `QuestionNotFound` for an unknown (question, chapter) pair,
    /// and `Storage` if persistence fails.
    pub async fn submit_answer(
        &self,
        request: SubmitAnswerRequest,
    ) -> Result<SubmittedAnswer, QuizServiceError> {
        let selected: AnswerOption = request.user_answer.parse()?;
        let user_id = UserId::new(request.user_id)?;

        let question = self
            .catalog
            .get_question(request.question_id)
            .await?
            .filter(|q| q.chapter_id() == request.chapter_id)
            .ok_or(QuizServiceError::QuestionNotFound)?;

        let new_answer = NewAnswer {
            user_id,
            chapter_id: request.chapter_id,
            question_id: request.question_id,
            user_answer: selected,
            is_correct: question.grade(selected),
            answered_at: self.clock.now(),
        };
        let answer = self.answers.append_answer(&new_answer).await?;
        Ok(SubmittedAnswer {
            answer,
            correct_answer: question.correct_answer(),
        })
    }

    /// The user's answers for one chapter, newest first, enriched with each
    /// question's text and solution.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UserId` for an empty id and `Storage` if
    /// repository access fails.
    pub async fn chapter_history(
        &self,
        user_id: &str,
        chapter: ChapterId,
    ) -> Result<Vec<AnswerDetail>, QuizServiceError> {
        let user_id = UserId::new(user_id)?;
        let answers = self.answers.answers_for_chapter(&user_id, chapter).await?;
        let questions = question_index(self.catalog.questions_for_chapter(chapter).await?);
        Ok(enrich(answers, &questions))
    }

    /// All of the user's answers grouped by chapter (newest first within
    /// each), enriched with question text and solution.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UserId` for an empty id and `Storage` if
    /// repository access fails.
    pub async fn all_history(&self, user_id: &str) -> Result<Vec<AnswerDetail>, QuizServiceError> {
        let user_id = UserId::new(user_id)?;
        let answers = self.answers.answers_for_user(&user_id).await?;

        let chapters: BTreeSet<ChapterId> = answers.iter().map(|a| a.chapter_id).collect();
        let mut questions = HashMap::new();
        for chapter in chapters {
            questions.extend(question_index(
                self.catalog.questions_for_chapter(chapter).await?,
            ));
        }
        Ok(enrich(answers, &questions))
    }

    /// The user's attempts at one question, newest first.
    ///
    /// An unknown question yields an empty history rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UserId` for an empty id and `Storage` if
    /// repository access fails.
    pub async fn question_history(
        &self,
        user_id: &str,
        question: QuestionId,
    ) -> Result<Vec<AnswerDetail>, QuizServiceError> {
        let user_id = UserId::new(user_id)?;
        let Some(question) = self.catalog.get_question(question).await? else {
            return Ok(Vec::new());
        };
        let answers = self
            .answers
            .answers_for_question(&user_id, question.id())
            .await?;
        let questions = question_index(vec![question]);
        Ok(enrich(answers, &questions))
    }

    /// Per-chapter score aggregates over the user's whole ledger, ordered by
    /// chapter id. Chapters without answers do not appear; a chapter that has
    /// left the catalog is skipped.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UserId` for an empty id and `Storage` if
    /// repository access fails.
    pub async fn score_summary(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChapterScore>, QuizServiceError> {
        let user_id = UserId::new(user_id)?;
        let answers = self.answers.answers_for_user(&user_id).await?;
        let titles: HashMap<ChapterId, String> = self
            .catalog
            .list_chapters()
            .await?
            .into_iter()
            .map(|c| (c.id(), c.title().to_string()))
            .collect();

        let mut by_chapter: BTreeMap<ChapterId, Vec<QuizAnswer>> = BTreeMap::new();
        for answer in answers {
            by_chapter.entry(answer.chapter_id).or_default().push(answer);
        }

        let scores = by_chapter
            .into_iter()
            .filter_map(|(chapter_id, answers)| {
                let title = titles.get(&chapter_id)?;
                Some(ChapterScore::from_answers(chapter_id, title, &answers))
            })
            .collect();
        Ok(scores)
    }

    /// Soft-delete the user's answers, optionally scoped to one chapter;
    /// returns how many rows went away.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UserId` for an empty id and `Storage` if
    /// the write fails.
    pub async fn clear_history(
        &self,
        user_id: &str,
        chapter: Option<ChapterId>,
    ) -> Result<u64, QuizServiceError> {
        let user_id = UserId::new(user_id)?;
        let deleted = self
            .answers
            .clear_answers(&user_id, chapter, self.clock.now())
            .await?;
        Ok(deleted)
    }
}

//
// ─── HELPERS ───────────────────────────────────────────────────────────────────
//

fn question_index(questions: Vec<QuizQuestion>) -> HashMap<QuestionId, QuizQuestion> {
    questions.into_iter().map(|q| (q.id(), q)).collect()
}

/// Join ledger rows with their questions. Rows whose question has left the
/// catalog are dropped, since there is no text to show for them.
fn enrich(
    answers: Vec<QuizAnswer>,
    questions: &HashMap<QuestionId, QuizQuestion>,
) -> Vec<AnswerDetail> {
    answers
        .into_iter()
        .filter_map(|answer| {
            let question = questions.get(&answer.question_id)?;
            Some(AnswerDetail {
                question_text: question.question_text().to_string(),
                correct_answer: question.correct_answer(),
                answer,
            })
        })
        .collect()
}
