//! Pure derivations over the quiz catalog and the answer ledger.
//!
//! Everything here is computed from a chapter's question list plus one user's
//! live answers for that chapter. Storage hands over plain rows; the merge
//! logic (latest attempt per question, resume point, score aggregates) lives
//! here so it can be tested without a database.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AnswerOption, ChapterId, QuestionId, QuizAnswer, QuizQuestion};

//
// ─── PER-QUESTION VIEW ─────────────────────────────────────────────────────────
//

/// A question merged with the user's latest attempt at it.
///
/// `correct_answer` is only revealed once the user has answered; an untouched
/// question never leaks the solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionStatus {
    pub id: QuestionId,
    pub chapter_id: ChapterId,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub order_index: u32,
    pub created_at: DateTime<Utc>,
    pub has_answered: bool,
    pub user_answer: Option<AnswerOption>,
    pub is_correct: Option<bool>,
    pub answered_at: Option<DateTime<Utc>>,
    pub correct_answer: Option<AnswerOption>,
    pub times_attempted: u32,
}

/// A chapter's full quiz state for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterQuizStatus {
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    pub total_questions: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub questions: Vec<QuestionStatus>,
}

/// Merge a chapter's questions with one user's answers.
///
/// Questions come out in `order_index` order (ties broken by id). A question
/// counts as answered when it has at least one ledger row, and as correct
/// when its latest attempt is correct; earlier wrong attempts do not stick.
#[must_use]
pub fn chapter_quiz_status(
    chapter_id: ChapterId,
    chapter_title: &str,
    questions: &[QuizQuestion],
    answers: &[QuizAnswer],
) -> ChapterQuizStatus {
    let ordered = ordered_questions(questions);

    let mut statuses = Vec::with_capacity(ordered.len());
    let mut questions_answered = 0u32;
    let mut correct_answers = 0u32;

    for question in ordered {
        let latest = latest_attempt(answers, question.id());
        let times_attempted = attempt_count(answers, question.id());
        let has_answered = latest.is_some();

        if has_answered {
            questions_answered += 1;
        }
        if latest.is_some_and(|a| a.is_correct) {
            correct_answers += 1;
        }

        statuses.push(QuestionStatus {
            id: question.id(),
            chapter_id: question.chapter_id(),
            question_text: question.question_text().to_string(),
            option_a: question.option_a().to_string(),
            option_b: question.option_b().to_string(),
            option_c: question.option_c().to_string(),
            option_d: question.option_d().to_string(),
            order_index: question.order_index(),
            created_at: question.created_at(),
            has_answered,
            user_answer: latest.map(|a| a.user_answer),
            is_correct: latest.map(|a| a.is_correct),
            answered_at: latest.map(|a| a.answered_at),
            correct_answer: has_answered.then(|| question.correct_answer()),
            times_attempted,
        });
    }

    ChapterQuizStatus {
        chapter_id,
        chapter_title: chapter_title.to_string(),
        total_questions: u32::try_from(statuses.len()).unwrap_or(u32::MAX),
        questions_answered,
        correct_answers,
        questions: statuses,
    }
}

//
// ─── RESUME POINT ──────────────────────────────────────────────────────────────
//

/// First question in `order_index` order with no recorded attempt.
///
/// This is the resume point: a wrong attempt still counts as attempted, and
/// clearing history re-opens questions. `None` means every question has been
/// attempted (or there are none), i.e. the quiz is complete for this user.
#[must_use]
pub fn resume_target<'a>(
    questions: &'a [QuizQuestion],
    answers: &[QuizAnswer],
) -> Option<&'a QuizQuestion> {
    ordered_questions(questions)
        .into_iter()
        .find(|q| attempt_count(answers, q.id()) == 0)
}

//
// ─── SCORE SUMMARY ─────────────────────────────────────────────────────────────
//

/// Aggregate score for one chapter, counted over ledger rows.
///
/// `total_answered` counts submissions, not distinct questions; answering the
/// same question three times contributes three to the denominator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterScore {
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    pub total_answered: u32,
    pub total_correct: u32,
    pub total_wrong: u32,
    pub percentage: f64,
}

impl ChapterScore {
    /// Fold one chapter's ledger rows into an aggregate.
    #[must_use]
    pub fn from_answers(
        chapter_id: ChapterId,
        chapter_title: impl Into<String>,
        answers: &[QuizAnswer],
    ) -> Self {
        let total_answered = u32::try_from(answers.len()).unwrap_or(u32::MAX);
        let total_correct =
            u32::try_from(answers.iter().filter(|a| a.is_correct).count()).unwrap_or(u32::MAX);
        Self {
            chapter_id,
            chapter_title: chapter_title.into(),
            total_answered,
            total_correct,
            total_wrong: total_answered - total_correct,
            percentage: score_percentage(total_correct, total_answered),
        }
    }
}

/// Percentage of correct submissions, rounded to two decimals.
///
/// Zero submissions yield 0.0 rather than a division error.
#[must_use]
pub fn score_percentage(correct: u32, answered: u32) -> f64 {
    if answered == 0 {
        return 0.0;
    }
    let raw = f64::from(correct) / f64::from(answered) * 100.0;
    (raw * 100.0).round() / 100.0
}

//
// ─── HELPERS ───────────────────────────────────────────────────────────────────
//

fn ordered_questions(questions: &[QuizQuestion]) -> Vec<&QuizQuestion> {
    let mut ordered: Vec<&QuizQuestion> = questions.iter().collect();
    ordered.sort_by_key(|q| (q.order_index(), q.id()));
    ordered
}

/// Latest attempt at a question: max `answered_at`, ties broken by the ledger
/// row id (ids are monotonic, so this is insertion order).
fn latest_attempt<'a>(answers: &'a [QuizAnswer], question: QuestionId) -> Option<&'a QuizAnswer> {
    answers
        .iter()
        .filter(|a| a.question_id == question)
        .max_by_key(|a| (a.answered_at, a.id))
}

fn attempt_count(answers: &[QuizAnswer], question: QuestionId) -> u32 {
    u32::try_from(answers.iter().filter(|a| a.question_id == question).count()).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn chapter() -> ChapterId {
        ChapterId::new(1)
    }

    fn build_question(id: u64, order_index: u32, correct: AnswerOption) -> QuizQuestion {
        QuizQuestion::new(
            QuestionId::new(id),
            chapter(),
            format!("Question {id}"),
            "first",
            "second",
            "third",
            "fourth",
            correct,
            order_index,
            fixed_now(),
        )
        .unwrap()
    }

    fn build_answer(
        id: i64,
        question: u64,
        selected: AnswerOption,
        is_correct: bool,
        at: DateTime<Utc>,
    ) -> QuizAnswer {
        QuizAnswer {
            id,
            user_id: UserId::new("learner").unwrap(),
            chapter_id: chapter(),
            question_id: QuestionId::new(question),
            user_answer: selected,
            is_correct,
            answered_at: at,
        }
    }

    #[test]
    fn resume_returns_first_unanswered_in_order() {
        let questions = vec![
            build_question(1, 1, AnswerOption::A),
            build_question(2, 2, AnswerOption::B),
            build_question(3, 3, AnswerOption::C),
        ];
        // Question 1 answered, question 2 skipped, question 3 answered.
        let answers = vec![
            build_answer(1, 1, AnswerOption::A, true, fixed_now()),
            build_answer(2, 3, AnswerOption::C, true, fixed_now()),
        ];

        let target = resume_target(&questions, &answers).unwrap();
        assert_eq!(target.id(), QuestionId::new(2));
    }

    #[test]
    fn resume_ignores_declaration_order_of_questions() {
        // Slice order differs from order_index order.
        let questions = vec![
            build_question(3, 3, AnswerOption::C),
            build_question(1, 1, AnswerOption::A),
            build_question(2, 2, AnswerOption::B),
        ];
        let target = resume_target(&questions, &[]).unwrap();
        assert_eq!(target.id(), QuestionId::new(1));
    }

    #[test]
    fn wrong_attempts_still_count_as_attempted() {
        let questions = vec![
            build_question(1, 1, AnswerOption::A),
            build_question(2, 2, AnswerOption::B),
        ];
        let answers = vec![build_answer(1, 1, AnswerOption::D, false, fixed_now())];

        let target = resume_target(&questions, &answers).unwrap();
        assert_eq!(target.id(), QuestionId::new(2));
    }

    #[test]
    fn resume_is_none_when_all_attempted() {
        let questions = vec![build_question(1, 1, AnswerOption::A)];
        let answers = vec![build_answer(1, 1, AnswerOption::B, false, fixed_now())];
        assert!(resume_target(&questions, &answers).is_none());
    }

    #[test]
    fn resume_is_none_for_empty_question_list() {
        assert!(resume_target(&[], &[]).is_none());
    }

    #[test]
    fn earlier_gap_wins_over_later_progress() {
        // Clearing or skipping an early question re-opens it even though
        // later questions were answered afterwards.
        let questions = vec![
            build_question(1, 1, AnswerOption::A),
            build_question(2, 2, AnswerOption::B),
            build_question(3, 3, AnswerOption::C),
        ];
        let answers = vec![
            build_answer(5, 2, AnswerOption::B, true, fixed_now()),
            build_answer(6, 3, AnswerOption::C, true, fixed_now() + Duration::seconds(5)),
        ];
        let target = resume_target(&questions, &answers).unwrap();
        assert_eq!(target.id(), QuestionId::new(1));
    }

    #[test]
    fn status_uses_latest_attempt_per_question() {
        let questions = vec![build_question(1, 1, AnswerOption::B)];
        let answers = vec![
            build_answer(1, 1, AnswerOption::A, false, fixed_now()),
            build_answer(2, 1, AnswerOption::B, true, fixed_now() + Duration::minutes(1)),
        ];

        let status = chapter_quiz_status(chapter(), "Intro", &questions, &answers);
        assert_eq!(status.total_questions, 1);
        assert_eq!(status.questions_answered, 1);
        assert_eq!(status.correct_answers, 1);

        let q = &status.questions[0];
        assert_eq!(q.times_attempted, 2);
        assert_eq!(q.user_answer, Some(AnswerOption::B));
        assert_eq!(q.is_correct, Some(true));
        assert_eq!(q.answered_at, Some(fixed_now() + Duration::minutes(1)));
    }

    #[test]
    fn later_wrong_attempt_overrides_earlier_correct_one() {
        let questions = vec![build_question(1, 1, AnswerOption::B)];
        let answers = vec![
            build_answer(1, 1, AnswerOption::B, true, fixed_now()),
            build_answer(2, 1, AnswerOption::C, false, fixed_now() + Duration::minutes(1)),
        ];

        let status = chapter_quiz_status(chapter(), "Intro", &questions, &answers);
        assert_eq!(status.questions_answered, 1);
        assert_eq!(status.correct_answers, 0);
        assert_eq!(status.questions[0].is_correct, Some(false));
    }

    #[test]
    fn equal_timestamps_resolve_by_row_id() {
        let questions = vec![build_question(1, 1, AnswerOption::B)];
        let answers = vec![
            build_answer(2, 1, AnswerOption::B, true, fixed_now()),
            build_answer(1, 1, AnswerOption::A, false, fixed_now()),
        ];

        let status = chapter_quiz_status(chapter(), "Intro", &questions, &answers);
        assert_eq!(status.questions[0].user_answer, Some(AnswerOption::B));
        assert_eq!(status.questions[0].is_correct, Some(true));
    }

    #[test]
    fn correct_answer_hidden_until_answered() {
        let questions = vec![
            build_question(1, 1, AnswerOption::B),
            build_question(2, 2, AnswerOption::C),
        ];
        let answers = vec![build_answer(1, 1, AnswerOption::A, false, fixed_now())];

        let status = chapter_quiz_status(chapter(), "Intro", &questions, &answers);
        assert_eq!(status.questions[0].correct_answer, Some(AnswerOption::B));
        assert_eq!(status.questions[1].correct_answer, None);
        assert_eq!(status.questions[1].user_answer, None);
        assert_eq!(status.questions[1].times_attempted, 0);
    }

    #[test]
    fn score_counts_submissions_not_questions() {
        let answers = vec![
            build_answer(1, 1, AnswerOption::A, true, fixed_now()),
            build_answer(2, 1, AnswerOption::B, false, fixed_now()),
            build_answer(3, 2, AnswerOption::C, true, fixed_now()),
        ];
        let score = ChapterScore::from_answers(chapter(), "Intro", &answers);
        assert_eq!(score.total_answered, 3);
        assert_eq!(score.total_correct, 2);
        assert_eq!(score.total_wrong, 1);
        assert!((score.percentage - 66.67).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_is_zero_for_empty_ledger() {
        let score = ChapterScore::from_answers(chapter(), "Intro", &[]);
        assert_eq!(score.total_answered, 0);
        assert!((score.percentage - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert!((score_percentage(1, 3) - 33.33).abs() < f64::EPSILON);
        assert!((score_percentage(2, 3) - 66.67).abs() < f64::EPSILON);
        assert!((score_percentage(3, 3) - 100.0).abs() < f64::EPSILON);
    }
}
