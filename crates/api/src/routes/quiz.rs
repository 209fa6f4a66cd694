//! Quiz routes.
//!
//! - `POST   /api/quiz/submit`                                         — grade and append one answer
//! - `GET    /api/quiz/history/user/{user_id}`                         — full ledger, enriched
//! - `GET    /api/quiz/history/user/{user_id}/chapter/{chapter_id}`    — one chapter's ledger
//! - `GET    /api/quiz/history/user/{user_id}/question/{question_id}`  — one question's attempts
//! - `GET    /api/quiz/score/user/{user_id}`                           — per-chapter score summary
//! - `DELETE /api/quiz/history/user/{user_id}/clear?chapter_id=N`      — soft-delete the ledger
//! - `GET    /api/quiz/chapter/{id}/with-history?user_id=U`            — quiz merged with attempts
//! - `GET    /api/quiz/resume/user/{user_id}/chapter/{chapter_id}`     — first unanswered question

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use course_core::model::{ChapterId, QuestionId};
use services::SubmitAnswerRequest;

use crate::error::ApiError;
use crate::extract::json_body;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/quiz/submit", post(submit_answer))
        .route("/api/quiz/history/user/{user_id}", get(all_history))
        .route(
            "/api/quiz/history/user/{user_id}/chapter/{chapter_id}",
            get(chapter_history),
        )
        .route(
            "/api/quiz/history/user/{user_id}/question/{question_id}",
            get(question_history),
        )
        .route(
            "/api/quiz/history/user/{user_id}/clear",
            delete(clear_history),
        )
        .route("/api/quiz/score/user/{user_id}", get(score_summary))
        .route("/api/quiz/chapter/{id}/with-history", get(quiz_with_history))
        .route(
            "/api/quiz/resume/user/{user_id}/chapter/{chapter_id}",
            get(resume_point),
        )
}

/// Wire shape of a submission. `user_answer` stays a plain string so the
/// service can reject bad letters with its own message.
#[derive(Debug, Deserialize)]
struct SubmitAnswerBody {
    user_id: String,
    chapter_id: u64,
    question_id: u64,
    user_answer: String,
}

impl From<SubmitAnswerBody> for SubmitAnswerRequest {
    fn from(body: SubmitAnswerBody) -> Self {
        Self {
            user_id: body.user_id,
            chapter_id: ChapterId::new(body.chapter_id),
            question_id: QuestionId::new(body.question_id),
            user_answer: body.user_answer,
        }
    }
}

async fn submit_answer(
    State(state): State<AppState>,
    body: Result<Json<SubmitAnswerBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let submitted = state.services().quiz().submit_answer(body.into()).await?;

    tracing::info!(
        user_id = submitted.answer.user_id.as_str(),
        question_id = submitted.answer.question_id.value(),
        is_correct = submitted.answer.is_correct,
        "quiz answer recorded"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Answer submitted successfully",
        "is_correct": submitted.answer.is_correct,
        "correct_answer": submitted.correct_answer,
        "answer": submitted.answer,
    })))
}

async fn all_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let answers = state.services().quiz().all_history(&user_id).await?;
    Ok(Json(json!({
        "success": true,
        "answers": answers,
    })))
}

async fn chapter_history(
    State(state): State<AppState>,
    Path((user_id, chapter_id)): Path<(String, u64)>,
) -> Result<Json<Value>, ApiError> {
    let answers = state
        .services()
        .quiz()
        .chapter_history(&user_id, ChapterId::new(chapter_id))
        .await?;
    Ok(Json(json!({
        "success": true,
        "answers": answers,
    })))
}

async fn question_history(
    State(state): State<AppState>,
    Path((user_id, question_id)): Path<(String, u64)>,
) -> Result<Json<Value>, ApiError> {
    let answers = state
        .services()
        .quiz()
        .question_history(&user_id, QuestionId::new(question_id))
        .await?;
    Ok(Json(json!({
        "success": true,
        "answers": answers,
    })))
}

#[derive(Debug, Deserialize)]
struct ClearParams {
    chapter_id: Option<u64>,
}

async fn clear_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ClearParams>,
) -> Result<Json<Value>, ApiError> {
    let chapter = params.chapter_id.map(ChapterId::new);
    let deleted = state
        .services()
        .quiz()
        .clear_history(&user_id, chapter)
        .await?;

    tracing::info!(user_id = %user_id, deleted, "quiz history cleared");

    Ok(Json(json!({
        "success": true,
        "message": "Quiz history cleared successfully",
        "deleted": deleted,
    })))
}

async fn score_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let scores = state.services().quiz().score_summary(&user_id).await?;
    Ok(Json(json!({
        "success": true,
        "scores": scores,
    })))
}

#[derive(Debug, Deserialize)]
struct WithHistoryParams {
    user_id: Option<String>,
}

async fn quiz_with_history(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<WithHistoryParams>,
) -> Result<Json<Value>, ApiError> {
    let user_id = params
        .user_id
        .ok_or_else(|| ApiError::BadRequest("user_id query parameter is required".to_string()))?;
    let quiz = state
        .services()
        .resume()
        .quiz_with_history(ChapterId::new(id), &user_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "quiz": quiz,
    })))
}

async fn resume_point(
    State(state): State<AppState>,
    Path((user_id, chapter_id)): Path<(String, u64)>,
) -> Result<Json<Value>, ApiError> {
    let resume = state
        .services()
        .resume()
        .resume_point(&user_id, ChapterId::new(chapter_id))
        .await?;

    if resume.completed {
        Ok(Json(json!({
            "success": true,
            "completed": true,
            "message": "All quiz questions completed",
        })))
    } else {
        Ok(Json(json!({
            "success": true,
            "completed": false,
            "resume_point": resume.resume_point,
        })))
    }
}
