//! Health check endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture, HealthReport};
use database::mongodb::check_health_detailed;

use crate::state::AppState;

/// Report MongoDB reachability
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "All dependencies are up", body = HealthReport),
        (status = 503, description = "A dependency is down", body = HealthReport)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let timeout = state.config.server.request_timeout;

    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "MongoDB",
        Box::pin(async {
            let status = tokio::time::timeout(timeout, check_health_detailed(&state.mongo_client))
                .await
                .map_err(|_| "ping timed out".to_string())?;

            tracing::debug!(
                healthy = status.healthy,
                response_time_ms = status.response_time_ms,
                "MongoDB health check"
            );
            if status.healthy {
                Ok(())
            } else {
                Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
            }
        }),
    )];

    run_health_checks(checks).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}
