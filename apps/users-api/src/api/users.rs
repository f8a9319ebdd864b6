//! Users API routes

use axum::{middleware, Router};
use axum_helpers::require_static_bearer;
use domain_users::{handlers, MongoUserRepository, UserService};

use crate::state::AppState;

/// Create users router, gated by the stub bearer check when configured
pub fn router(state: &AppState) -> Router {
    let repository = MongoUserRepository::new(&state.db);
    let service = UserService::new(repository);
    let routes = handlers::router(service);

    match &state.config.static_token {
        Some(bearer) => routes.layer(middleware::from_fn_with_state(
            bearer.clone(),
            require_static_bearer,
        )),
        None => routes,
    }
}

/// Initialize users indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let repository = MongoUserRepository::new(&state.db);
    repository
        .create_indexes(state.config.index_timeout)
        .await?;
    Ok(())
}
