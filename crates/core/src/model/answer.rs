use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ids::{ChapterId, QuestionId, UserId};
use crate::model::question::AnswerOption;

/// One entry in the append-only quiz answer ledger.
///
/// Every submission appends a new row; resubmitting the same question keeps
/// the full attempt history. `is_correct` is graded at submission time against
/// the question's stored correct answer and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizAnswer {
    pub id: i64,
    pub user_id: UserId,
    pub chapter_id: ChapterId,
    #[serde(rename = "quiz_question_id")]
    pub question_id: QuestionId,
    pub user_answer: AnswerOption,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}
