//! HTTP surface for the course backend.
//!
//! Thin axum layer over [`services::AppServices`]: handlers translate paths,
//! queries and JSON bodies into service calls and wrap the results in the
//! `{"success": ..., ...}` envelopes the frontend expects. All domain rules
//! live below this crate.
//!
//! ## Route map
//!
//! | Prefix           | Module                | Domain                       |
//! |------------------|-----------------------|------------------------------|
//! | `/api/auth/*`     | [`routes::auth`]     | login, logout, user lookup   |
//! | `/api/chapters/*` | [`routes::chapters`] | catalog reads                |
//! | `/api/progress/*` | [`routes::progress`] | progress saves, views, reset |
//! | `/api/quiz/*`     | [`routes::quiz`]     | answers, history, resume     |
//! | `/health`         | (here)               | liveness + database probe    |
//!
//! Status mapping and the failure envelope live in [`error::ApiError`].

#![forbid(unsafe_code)]

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
///
/// CORS is wide open (the frontend is served from a different origin in
/// every deployment this backend has seen) and every request is traced.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::auth::router())
        .merge(routes::chapters::router())
        .merge(routes::progress::router())
        .merge(routes::quiz::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health — liveness plus a database roundtrip when a pool is attached.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = state.db() {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("database health check failed: {e}");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unreachable" })),
            )
                .into_response();
        }
    }

    Json(json!({ "status": "ok", "database": "connected" })).into_response()
}
