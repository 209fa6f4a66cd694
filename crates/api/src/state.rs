//! Shared handler state.

use std::sync::Arc;

use services::AppServices;
use sqlx::SqlitePool;

/// State cloned into every handler.
///
/// The pool handle is only present when the backend runs on `SQLite`; router
/// tests over in-memory storage leave it out and the health probe skips the
/// database roundtrip.
#[derive(Clone)]
pub struct AppState {
    services: Arc<AppServices>,
    db: Option<SqlitePool>,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self {
            services: Arc::new(services),
            db: None,
        }
    }

    /// Attach the pool backing the services, enabling the live health probe.
    #[must_use]
    pub fn with_db(mut self, pool: SqlitePool) -> Self {
        self.db = Some(pool);
        self
    }

    #[must_use]
    pub fn services(&self) -> &AppServices {
        &self.services
    }

    #[must_use]
    pub fn db(&self) -> Option<&SqlitePool> {
        self.db.as_ref()
    }
}
