pub mod handlers;
pub mod responses;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use utoipa::ToSchema;

/// Boxed error returned by business operations.
///
/// Anything that is not an [`ApiError`] is reported to clients as a generic
/// internal error.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Error body returned for every non-2xx response.
///
/// ```json
/// { "code": "409", "message": "already exists with the same nickname or email" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// The four error kinds a client can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub const fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "400",
            ErrorKind::NotFound => "404",
            ErrorKind::Conflict => "409",
            ErrorKind::Internal => "500",
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "invalid argument",
            ErrorKind::NotFound => "resource not found",
            ErrorKind::Conflict => "already exists",
            ErrorKind::Internal => "internal server error",
        }
    }
}

/// Typed, immutable API error.
///
/// The base errors are constants; customising one never touches the
/// original, every builder method returns a new value:
///
/// ```rust
/// use axum_helpers::ApiError;
///
/// let err = ApiError::CONFLICT.with_message("email already taken");
/// assert_eq!(err.message(), "email already taken");
/// assert_eq!(ApiError::CONFLICT.message(), "already exists");
/// ```
///
/// The optional cause is kept for logs only and never serialized.
#[derive(Debug, Clone)]
pub struct ApiError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl ApiError {
    pub const BAD_REQUEST: ApiError = ApiError::base(ErrorKind::BadRequest);
    pub const NOT_FOUND: ApiError = ApiError::base(ErrorKind::NotFound);
    pub const CONFLICT: ApiError = ApiError::base(ErrorKind::Conflict);
    pub const INTERNAL: ApiError = ApiError::base(ErrorKind::Internal);

    const fn base(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: Cow::Borrowed(kind.default_message()),
            cause: None,
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BAD_REQUEST.with_message(message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NOT_FOUND.with_message(message)
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::CONFLICT.with_message(message)
    }

    /// Internal error with the generic message and `cause` attached.
    pub fn internal<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::INTERNAL.with_cause(cause)
    }

    /// Same kind and cause, new message.
    #[must_use]
    pub fn with_message(&self, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: self.kind,
            message: message.into(),
            cause: self.cause.clone(),
        }
    }

    /// Same kind and message, with `cause` attached for diagnostics.
    #[must_use]
    pub fn with_cause<E>(&self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The only representation ever sent to a client.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.message.to_string(),
        }
    }

    /// Map any boxed error onto the taxonomy.
    ///
    /// Typed errors pass through; anything else becomes [`ApiError::INTERNAL`]
    /// with the original kept as the cause.
    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<ApiError>() {
            Ok(api) => *api,
            Err(other) => Self {
                cause: Some(Arc::from(other)),
                ..Self::INTERNAL
            },
        }
    }

    fn log(&self) {
        match self.kind {
            ErrorKind::Internal => tracing::error!(
                code = self.code(),
                message = %self.message,
                cause = ?self.cause,
                "Request failed"
            ),
            ErrorKind::Conflict | ErrorKind::NotFound => {
                tracing::info!(code = self.code(), message = %self.message, "Request rejected")
            }
            ErrorKind::BadRequest => {
                tracing::warn!(code = self.code(), message = %self.message, "Invalid request")
            }
        }
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} code:{}", self.message, self.code())
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.to_response())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StoreDown;

    impl fmt::Display for StoreDown {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection reset by peer")
        }
    }

    impl StdError for StoreDown {}

    #[test]
    fn test_base_errors_have_distinct_triples() {
        let bases = [
            (ApiError::BAD_REQUEST, 400, "400", "invalid argument"),
            (ApiError::NOT_FOUND, 404, "404", "resource not found"),
            (ApiError::CONFLICT, 409, "409", "already exists"),
            (ApiError::INTERNAL, 500, "500", "internal server error"),
        ];

        for (err, status, code, message) in bases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
            assert_eq!(err.message(), message);
            assert!(err.cause().is_none());
        }
    }

    #[test]
    fn test_with_message_leaves_original_untouched() {
        let base = ApiError::NOT_FOUND;
        let custom = base.with_message("user record not found");

        assert_eq!(custom.kind(), ErrorKind::NotFound);
        assert_eq!(custom.message(), "user record not found");
        assert_eq!(base.message(), "resource not found");
        assert_eq!(ApiError::NOT_FOUND.message(), "resource not found");
    }

    #[test]
    fn test_with_cause_keeps_public_surface() {
        let err = ApiError::INTERNAL.with_cause(StoreDown);

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "internal server error");
        assert_eq!(
            err.cause().map(|c| c.to_string()).as_deref(),
            Some("connection reset by peer")
        );
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_to_response_never_contains_cause() {
        let err = ApiError::conflict("already exists").with_cause(StoreDown);
        let body = serde_json::to_string(&err.to_response()).unwrap();

        assert_eq!(body, r#"{"code":"409","message":"already exists"}"#);
        assert!(!body.contains("connection reset"));
    }

    #[test]
    fn test_from_boxed_passes_typed_errors_through() {
        let boxed: BoxError = Box::new(ApiError::bad_request("email can't be empty"));
        let err = ApiError::from_boxed(boxed);

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "email can't be empty");
    }

    #[test]
    fn test_from_boxed_hides_untyped_errors() {
        let boxed: BoxError = Box::new(StoreDown);
        let err = ApiError::from_boxed(boxed);

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), "internal server error");
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_display_includes_code() {
        assert_eq!(ApiError::CONFLICT.to_string(), "already exists code:409");
    }

    #[test]
    fn test_into_response_uses_status_and_body() {
        let response = ApiError::not_found("user not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
