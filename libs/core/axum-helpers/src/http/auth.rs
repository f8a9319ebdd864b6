//! Static bearer-token gate.
//!
//! A placeholder for real authentication: requests must carry
//! `Authorization: Bearer <token>` matching the configured value.

use crate::errors::ErrorResponse;
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// The accepted bearer token.
#[derive(Clone)]
pub struct StaticBearer {
    token: Arc<str>,
}

impl StaticBearer {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn accepts(&self, authorization: Option<&str>) -> bool {
        authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| presented.trim() == &*self.token)
    }
}

impl std::fmt::Debug for StaticBearer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticBearer")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Reject requests without the expected bearer token with 401.
///
/// ```ignore
/// let routes = routes.layer(axum::middleware::from_fn_with_state(
///     StaticBearer::new("secret"),
///     require_static_bearer,
/// ));
/// ```
pub async fn require_static_bearer(
    State(expected): State<StaticBearer>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !expected.accepts(authorization) {
        tracing::warn!(path = %request.uri().path(), "Rejected request without valid bearer token");
        return unauthorized();
    }

    next.run(request).await
}

fn unauthorized() -> Response {
    let body = ErrorResponse {
        code: StatusCode::UNAUTHORIZED.as_str().to_string(),
        message: "unauthorized".to_string(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
