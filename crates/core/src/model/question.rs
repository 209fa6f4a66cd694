use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{ChapterId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyQuestionText,

    #[error("answer option {0} cannot be empty")]
    EmptyOption(AnswerOption),
}

/// Raised when a submitted answer letter is not one of A, B, C, D.
///
/// The display string doubles as the client-facing validation message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid answer. Must be A, B, C, or D")]
pub struct ParseAnswerOptionError;

//
// ─── ANSWER OPTION ─────────────────────────────────────────────────────────────
//

/// One of the four multiple-choice slots.
///
/// Submitted answers parse strictly: only the uppercase single letters
/// `A`..`D` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        }
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerOption {
    type Err = ParseAnswerOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(AnswerOption::A),
            "B" => Ok(AnswerOption::B),
            "C" => Ok(AnswerOption::C),
            "D" => Ok(AnswerOption::D),
            _ => Err(ParseAnswerOptionError),
        }
    }
}

//
// ─── QUIZ QUESTION ─────────────────────────────────────────────────────────────
//

/// A multiple-choice question attached to a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    id: QuestionId,
    chapter_id: ChapterId,
    question_text: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    correct_answer: AnswerOption,
    order_index: u32,
    created_at: DateTime<Utc>,
}

impl QuizQuestion {
    /// Creates a question with validated text and options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the question text or any option is empty
    /// after trimming.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuestionId,
        chapter_id: ChapterId,
        question_text: impl Into<String>,
        option_a: impl Into<String>,
        option_b: impl Into<String>,
        option_c: impl Into<String>,
        option_d: impl Into<String>,
        correct_answer: AnswerOption,
        order_index: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuestionError> {
        let question_text = question_text.into().trim().to_string();
        if question_text.is_empty() {
            return Err(QuestionError::EmptyQuestionText);
        }

        let check = |slot: AnswerOption, text: String| -> Result<String, QuestionError> {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(QuestionError::EmptyOption(slot));
            }
            Ok(text)
        };

        Ok(Self {
            id,
            chapter_id,
            question_text,
            option_a: check(AnswerOption::A, option_a.into())?,
            option_b: check(AnswerOption::B, option_b.into())?,
            option_c: check(AnswerOption::C, option_c.into())?,
            option_d: check(AnswerOption::D, option_d.into())?,
            correct_answer,
            order_index,
            created_at,
        })
    }

    /// Grade a submitted option against the stored correct answer.
    #[must_use]
    pub fn grade(&self, selected: AnswerOption) -> bool {
        selected == self.correct_answer
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn chapter_id(&self) -> ChapterId {
        self.chapter_id
    }

    #[must_use]
    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    #[must_use]
    pub fn option_a(&self) -> &str {
        &self.option_a
    }

    #[must_use]
    pub fn option_b(&self) -> &str {
        &self.option_b
    }

    #[must_use]
    pub fn option_c(&self) -> &str {
        &self.option_c
    }

    #[must_use]
    pub fn option_d(&self) -> &str {
        &self.option_d
    }

    #[must_use]
    pub fn correct_answer(&self) -> AnswerOption {
        self.correct_answer
    }

    /// Position of the question within its chapter's quiz.
    #[must_use]
    pub fn order_index(&self) -> u32 {
        self.order_index
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
