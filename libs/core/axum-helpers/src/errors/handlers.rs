use axum::response::{IntoResponse, Response};

use super::ApiError;

/// Router fallback for unknown paths.
pub async fn not_found() -> Response {
    ApiError::NOT_FOUND.into_response()
}
