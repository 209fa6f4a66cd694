use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ids::UserId;

/// A known user.
///
/// Rows are created lazily on first login; `username` defaults to the
/// external identifier and is kept as display text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
