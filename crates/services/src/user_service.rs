use std::sync::Arc;

use course_core::model::{User, UserId};
use storage::repository::{NewUser, UserRepository};

use crate::Clock;
use crate::error::UserServiceError;

/// Login and user lookup.
///
/// There is no credential step: login validates the external identifier,
/// creates the row on first sight and returns it thereafter.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Log a user in, creating the row on first login.
    ///
    /// The username defaults to the external identifier. Concurrent first
    /// logins for the same identifier converge on a single row.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::UserId` if the identifier is empty after
    /// trimming. Returns `UserServiceError::Storage` if persistence fails.
    pub async fn login(&self, user_id: &str) -> Result<User, UserServiceError> {
        let user_id = UserId::new(user_id)?;
        let new_user = NewUser {
            username: user_id.as_str().to_string(),
            user_id,
            created_at: self.clock.now(),
        };
        let user = self.users.get_or_create_user(&new_user).await?;
        Ok(user)
    }

    /// Fetch a user by external id.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::UserNotFound` if no live row exists.
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn get_user(&self, user_id: &str) -> Result<User, UserServiceError> {
        let user_id = UserId::new(user_id)?;
        self.users
            .find_user(&user_id)
            .await?
            .ok_or(UserServiceError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use course_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    fn service() -> UserService {
        UserService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn login_creates_then_reuses_the_row() {
        let service = service();

        let first = service.login("student42").await.unwrap();
        let second = service.login("student42").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.username, "student42");
        assert_eq!(second.created_at, fixed_now());
    }

    #[tokio::test]
    async fn login_trims_the_identifier() {
        let service = service();
        let user = service.login("  student42  ").await.unwrap();
        assert_eq!(user.user_id.as_str(), "student42");

        let fetched = service.get_user("student42").await.unwrap();
        assert_eq!(fetched.id, user.id);
    }

    #[tokio::test]
    async fn blank_identifier_is_rejected_with_client_message() {
        let service = service();
        let err = service.login("   ").await.unwrap_err();
        assert_eq!(err.to_string(), "User ID cannot be empty");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let service = service();
        let err = service.get_user("ghost").await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }
}
