//! API routes module

pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
///
/// The user routes are served under both `/users` and `/api/users`.
pub fn routes(state: &AppState) -> Router {
    let users = users::router(state);

    Router::new()
        .nest_service("/users", users.clone())
        .nest_service("/api/users", users)
        .merge(health::router(state.clone()))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    users::init_indexes(state).await
}
