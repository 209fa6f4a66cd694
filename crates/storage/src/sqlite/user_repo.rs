use course_core::model::{User, UserId};

use super::SqliteRepository;
use super::mapping::map_user_row;
use crate::repository::{NewUser, StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn get_or_create_user(&self, new_user: &NewUser) -> Result<User, StorageError> {
        // First-writer-wins: the partial unique index on live user_id values
        // turns concurrent creates into a single row, and the re-read below
        // returns it regardless of which caller inserted.
        sqlx::query(
            r"
            INSERT INTO users (user_id, username, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) WHERE deleted_at IS NULL DO NOTHING
            ",
        )
        .bind(new_user.user_id.as_str())
        .bind(new_user.username.as_str())
        .bind(new_user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        self.find_user(&new_user.user_id)
            .await?
            .ok_or(StorageError::NotFound)
    }

    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, username, created_at
            FROM users
            WHERE user_id = ?1 AND deleted_at IS NULL
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_user_row(&row).map(Some),
            None => Ok(None),
        }
    }
}
