use axum::response::{IntoResponse, Response};
use axum_helpers::ApiError;
use thiserror::Error;

use crate::password::PasswordError;

pub const CONFLICT_MESSAGE: &str = "already exists with the same nickname or email";
pub const NOT_FOUND_MESSAGE: &str = "user record not found";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user record not found")]
    NotFound,

    #[error("already exists with the same nickname or email")]
    Duplicate,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Every user error lands on one of the four API error kinds.
impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => ApiError::not_found(NOT_FOUND_MESSAGE),
            UserError::Duplicate => ApiError::conflict(CONFLICT_MESSAGE),
            UserError::Validation(msg) => ApiError::bad_request(msg),
            UserError::Password(PasswordError::TooLong { .. }) => {
                ApiError::bad_request("password is too long")
            }
            UserError::Password(e) => ApiError::internal(e),
            UserError::Database(e) => ApiError::internal(e),
            UserError::Internal(msg) => ApiError::internal(UserError::Internal(msg)),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let api_error: ApiError = self.into();
        api_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::ErrorKind;

    #[test]
    fn test_maps_onto_taxonomy() {
        let cases = [
            (UserError::NotFound, ErrorKind::NotFound, NOT_FOUND_MESSAGE),
            (UserError::Duplicate, ErrorKind::Conflict, CONFLICT_MESSAGE),
            (
                UserError::Validation("id can't be empty".into()),
                ErrorKind::BadRequest,
                "id can't be empty",
            ),
            (
                UserError::Password(PasswordError::TooLong { max: 128 }),
                ErrorKind::BadRequest,
                "password is too long",
            ),
            (
                UserError::Internal("bson encoding failed".into()),
                ErrorKind::Internal,
                "internal server error",
            ),
        ];

        for (err, kind, message) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.kind(), kind);
            assert_eq!(api.message(), message);
        }
    }

    #[test]
    fn test_database_errors_keep_cause_but_hide_it() {
        let api: ApiError = UserError::Database(mongodb::error::Error::custom("socket closed")).into();

        assert_eq!(api.kind(), ErrorKind::Internal);
        assert_eq!(api.message(), "internal server error");
        assert!(api.cause().is_some());
    }
}
