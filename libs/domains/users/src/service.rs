use std::sync::Arc;
use tracing::instrument;

use crate::error::UserResult;
use crate::models::{CreateUser, FilterUsers, NewUser, Pagination, User, UserPatch};
use crate::password::hash_password;
use crate::repository::UserRepository;

/// Service layer for user business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Hash the password, then hand the user to the store.
    #[instrument(skip(self, input), fields(nick_name = %input.nick_name))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        let password_hash = hash_password(&input.password)?;

        let new_user = NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            nick_name: input.nick_name,
            password_hash,
            email: input.email,
            country: input.country,
        };

        self.repository.create(new_user).await
    }

    /// The path id is authoritative; the patch carries no identifier.
    #[instrument(skip(self, patch))]
    pub async fn update_user_by_id(&self, id: &str, patch: UserPatch) -> UserResult<User> {
        self.repository.update(id, patch).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user_by_id(&self, id: &str) -> UserResult<()> {
        self.repository.delete(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: &str) -> UserResult<User> {
        self.repository.get(id).await
    }

    /// One page of matching users wrapped in the pagination envelope
    #[instrument(skip(self))]
    pub async fn list_users(&self, request: FilterUsers) -> UserResult<Pagination<User>> {
        let limit = request.effective_limit();
        let offset = request.offset.max(0);

        let (items, total) = self
            .repository
            .list_by_filter(&request.filter, limit, offset as u64)
            .await?;

        Ok(Pagination::new(items, total, limit, offset))
    }

    #[instrument(skip(self, password))]
    pub async fn change_password(&self, id: &str, password: &str) -> UserResult<()> {
        let password_hash = hash_password(password)?;
        self.repository.update_password(id, password_hash).await
    }
}
