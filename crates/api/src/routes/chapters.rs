//! Catalog routes.
//!
//! - `GET /api/chapters`              — course outline
//! - `GET /api/chapters/{id}`         — one chapter
//! - `GET /api/chapters/{id}/video`   — the chapter's video
//! - `GET /api/chapters/{id}/quiz`    — the chapter's questions
//! - `GET /api/chapters/{id}/content` — chapter with video and questions nested
//!
//! All read-only; the catalog is written by the seed binary, not over HTTP.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use course_core::model::ChapterId;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/chapters", get(list_chapters))
        .route("/api/chapters/{id}", get(get_chapter))
        .route("/api/chapters/{id}/video", get(get_chapter_video))
        .route("/api/chapters/{id}/quiz", get(get_chapter_quiz))
        .route("/api/chapters/{id}/content", get(get_chapter_content))
}

async fn list_chapters(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let chapters = state.services().content().list_chapters().await?;
    Ok(Json(json!({
        "success": true,
        "chapters": chapters,
    })))
}

async fn get_chapter(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let chapter = state
        .services()
        .content()
        .get_chapter(ChapterId::new(id))
        .await?;
    Ok(Json(json!({
        "success": true,
        "chapter": chapter,
    })))
}

async fn get_chapter_video(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let video = state
        .services()
        .content()
        .chapter_video(ChapterId::new(id))
        .await?;
    Ok(Json(json!({
        "success": true,
        "video": video,
    })))
}

async fn get_chapter_quiz(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let questions = state
        .services()
        .content()
        .chapter_quiz(ChapterId::new(id))
        .await?;
    Ok(Json(json!({
        "success": true,
        "questions": questions,
    })))
}

async fn get_chapter_content(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let content = state
        .services()
        .content()
        .chapter_content(ChapterId::new(id))
        .await?;
    Ok(Json(json!({
        "success": true,
        "chapter": content,
    })))
}
