//! Progress routes.
//!
//! - `POST   /api/progress`                                      — save (atomic upsert)
//! - `GET    /api/progress/user/{user_id}`                       — latest position
//! - `GET    /api/progress/user/{user_id}/all`                   — every live row
//! - `GET    /api/progress/user/{user_id}/chapter/{chapter_id}`  — one chapter's rows
//! - `DELETE /api/progress/user/{user_id}/reset`                 — soft-delete everything

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use course_core::model::ChapterId;
use services::SaveProgressRequest;

use crate::error::ApiError;
use crate::extract::json_body;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/progress", post(save_progress))
        .route("/api/progress/user/{user_id}", get(user_progress))
        .route("/api/progress/user/{user_id}/all", get(all_progress))
        .route(
            "/api/progress/user/{user_id}/chapter/{chapter_id}",
            get(chapter_progress),
        )
        .route("/api/progress/user/{user_id}/reset", delete(reset_progress))
}

/// Wire shape of a save. `content_type` stays a plain string here so the
/// service can reject it with its own message instead of a serde error.
#[derive(Debug, Deserialize)]
struct SaveProgressBody {
    user_id: String,
    chapter_id: u64,
    content_type: String,
    video_timestamp: Option<u32>,
    quiz_question_index: Option<u32>,
    #[serde(default)]
    is_completed: bool,
}

impl From<SaveProgressBody> for SaveProgressRequest {
    fn from(body: SaveProgressBody) -> Self {
        Self {
            user_id: body.user_id,
            chapter_id: ChapterId::new(body.chapter_id),
            content_type: body.content_type,
            video_timestamp: body.video_timestamp,
            quiz_question_index: body.quiz_question_index,
            is_completed: body.is_completed,
        }
    }
}

async fn save_progress(
    State(state): State<AppState>,
    body: Result<Json<SaveProgressBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let progress = state
        .services()
        .progress()
        .save_progress(body.into())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Progress saved successfully",
        "progress": progress,
    })))
}

async fn user_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let summary = state.services().progress().latest_progress(&user_id).await?;

    if summary.has_progress {
        Ok(Json(json!({
            "success": true,
            "progress": summary,
        })))
    } else {
        Ok(Json(json!({
            "success": true,
            "progress": summary,
            "message": "No progress found for this user",
        })))
    }
}

async fn all_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let rows = state.services().progress().all_progress(&user_id).await?;
    Ok(Json(json!({
        "success": true,
        "progress": rows,
    })))
}

async fn chapter_progress(
    State(state): State<AppState>,
    Path((user_id, chapter_id)): Path<(String, u64)>,
) -> Result<Json<Value>, ApiError> {
    let rows = state
        .services()
        .progress()
        .chapter_progress(&user_id, ChapterId::new(chapter_id))
        .await?;
    Ok(Json(json!({
        "success": true,
        "progress": rows,
    })))
}

async fn reset_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = state.services().progress().reset_progress(&user_id).await?;

    tracing::info!(user_id = %user_id, deleted, "progress reset");

    Ok(Json(json!({
        "success": true,
        "message": "Progress reset successfully",
        "deleted": deleted,
    })))
}
