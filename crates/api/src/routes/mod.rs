//! Route modules, one per URL group:
//!
//! - `auth` — login, logout, user lookup
//! - `chapters` — catalog reads (chapters, videos, quizzes, bundled content)
//! - `progress` — per-user progress saves, views and reset
//! - `quiz` — answer submission, history, scores, resume

pub mod auth;
pub mod chapters;
pub mod progress;
pub mod quiz;
