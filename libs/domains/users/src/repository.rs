use async_trait::async_trait;

use crate::error::UserResult;
use crate::models::{NewUser, User, UserFilter, UserPatch};

/// Repository trait for User persistence
///
/// The only way the rest of the crate touches the `users` collection.
/// Implementations return [`UserError`](crate::UserError) values that map
/// onto the four API error kinds; raw driver errors never escape unwrapped.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with a generated id, Active status and version 0
    async fn create(&self, input: NewUser) -> UserResult<User>;

    /// Apply a partial update, bumping `updatedAt` and `version`
    async fn update(&self, id: &str, patch: UserPatch) -> UserResult<User>;

    /// One page of users matching `filter`, plus the total match count
    async fn list_by_filter(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: u64,
    ) -> UserResult<(Vec<User>, u64)>;

    /// Soft delete: flip status to Inactive
    async fn delete(&self, id: &str) -> UserResult<()>;

    /// Point lookup by id
    async fn get(&self, id: &str) -> UserResult<User>;

    /// Replace the stored password hash, bumping `updatedAt` and `version`
    async fn update_password(&self, id: &str, password_hash: String) -> UserResult<()>;
}
