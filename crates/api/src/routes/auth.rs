//! Authentication routes.
//!
//! - `POST /api/auth/login`          — create-on-first-login by external id
//! - `POST /api/auth/logout`         — stateless acknowledgement
//! - `GET  /api/auth/user/{user_id}` — look up an account
//!
//! There are no sessions or credentials; the external user id is the whole
//! identity, so logout has nothing to tear down.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::extract::json_body;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/user/{user_id}", get(get_user))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    user_id: String,
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(body)?;
    let user = state.services().users().login(&request.user_id).await?;

    tracing::info!(user_id = user.user_id.as_str(), "user logged in");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "user": user,
    })))
}

async fn logout() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Logout successful",
    }))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = state.services().users().get_user(&user_id).await?;
    Ok(Json(json!({
        "success": true,
        "user": user,
    })))
}
