use axum_helpers::{ApiError, ApiRequest, Violations, pipeline::de::number_or_string};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail};

/// Page size used when the client sends none (or zero)
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Document field names in the `users` collection
pub mod fields {
    pub const ID: &str = "_id";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const NICK_NAME: &str = "nickName";
    pub const PASSWORD: &str = "password";
    pub const EMAIL: &str = "email";
    pub const COUNTRY: &str = "country";
    pub const STATUS: &str = "status";
    pub const UPDATED_AT: &str = "updatedAt";
    pub const VERSION: &str = "version";
}

/// User lifecycle status, stored and serialized as an integer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum UserStatus {
    #[default]
    Active = 1,
    Inactive = 2,
}

impl UserStatus {
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl From<UserStatus> for i32 {
    fn from(status: UserStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i32> for UserStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(UserStatus::Active),
            2 => Ok(UserStatus::Inactive),
            other => Err(format!("Unknown user status: {}", other)),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Bookkeeping stamped by the store, inlined into the user document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Starts at 0, +1 on every successful update
    pub version: i32,
}

impl Meta {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

/// User as returned by the API. Carries no password in any form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-generated identifier
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all users
    pub nick_name: String,
    /// Unique across all users
    pub email: String,
    pub country: String,
    /// 1 = Active, 2 = Inactive
    #[schema(value_type = i32, example = 1)]
    pub status: UserStatus,
    #[serde(flatten)]
    pub meta: Meta,
}

/// Input to the store's create; the password is already hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub nick_name: String,
    pub password_hash: String,
    pub email: String,
    pub country: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("nick_name", &self.nick_name)
            .field("password_hash", &"[REDACTED]")
            .field("email", &self.email)
            .field("country", &self.country)
            .finish()
    }
}

/// Partial update: only provided fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[validate(length(min = 1, message = "firstName can't be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "lastName can't be empty"))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, message = "nickName can't be empty"))]
    pub nick_name: Option<String>,
    pub email: Option<String>,
    #[validate(length(min = 1, message = "country can't be empty"))]
    pub country: Option<String>,
    /// Only 2 (Inactive) is accepted
    #[schema(value_type = Option<i32>, example = 2)]
    pub status: Option<UserStatus>,
}

/// Sparse query-by-example. Empty strings are unconstrained; status 0
/// means Active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilter {
    #[serde(alias = "_id")]
    pub id: String,
    /// Case-insensitive prefix
    pub first_name: String,
    /// Case-insensitive prefix
    pub last_name: String,
    pub nick_name: String,
    pub email: String,
    pub country: String,
    /// 0 = Active (default), 1 = Active, 2 = Inactive
    #[serde(deserialize_with = "number_or_string")]
    pub status: i32,
}

/// Paginated list envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination<T> {
    pub total_records: u64,
    pub limit: i64,
    pub offset: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub items: Vec<T>,
}

impl<T> Pagination<T> {
    pub fn new(items: Vec<T>, total_records: u64, limit: i64, offset: i64) -> Self {
        let total = i64::try_from(total_records).unwrap_or(i64::MAX);
        Self {
            total_records,
            limit,
            offset,
            has_next: offset.saturating_add(limit) < total,
            has_previous: offset > 0,
            items,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

fn check_email(violations: &mut Violations, email: &str) {
    if email.is_empty() {
        violations.push("email", "email can't be empty");
    } else if !email.validate_email() {
        violations.push("email", "email is not valid");
    }
}

fn check_id(violations: &mut Violations, id: &str) {
    if id.trim().is_empty() {
        violations.push("id", "id can't be empty");
    }
}

/// Body of `POST /users`
#[derive(Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "firstName can't be empty"))]
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[validate(length(min = 1, message = "nickName can't be empty"))]
    #[schema(example = "ada")]
    pub nick_name: String,
    #[validate(length(min = 1, message = "password can't be empty"))]
    #[schema(write_only, example = "correct horse battery staple")]
    pub password: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "country can't be empty"))]
    #[schema(example = "UK")]
    pub country: String,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("nick_name", &self.nick_name)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .field("country", &self.country)
            .finish()
    }
}

impl ApiRequest for CreateUser {
    fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Violations::from_validator(Validate::validate(self));
        check_email(&mut violations, &self.email);
        violations.into_result()
    }
}

/// `PUT /users/{id}`: path id plus a partial body
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub patch: UserPatch,
}

impl UpdateUser {
    pub fn into_parts(self) -> (String, UserPatch) {
        (self.id, self.patch)
    }
}

impl ApiRequest for UpdateUser {
    const PATH_FIELDS: &'static [&'static str] = &["id"];

    fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Violations::from_validator(Validate::validate(&self.patch));
        check_id(&mut violations, &self.id);
        if let Some(email) = &self.patch.email {
            check_email(&mut violations, email);
        }
        if self.patch.status == Some(UserStatus::Active) {
            violations.push("status", "status can only be set to 2 (inactive)");
        }
        violations.into_result()
    }
}

/// `POST /users/filter`: filter body plus `limit`/`offset` query params
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterUsers {
    #[serde(flatten)]
    pub filter: UserFilter,
    #[serde(default, deserialize_with = "number_or_string")]
    pub limit: i64,
    #[serde(default, deserialize_with = "number_or_string")]
    pub offset: i64,
}

impl FilterUsers {
    /// Requested limit, with 0 meaning [`DEFAULT_LIMIT`].
    pub fn effective_limit(&self) -> i64 {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }
}

impl ApiRequest for FilterUsers {
    fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Violations::new();
        if self.limit < 0 {
            violations.push("limit", "limit can't be negative");
        } else if self.limit > MAX_LIMIT {
            violations.push("limit", format!("limit can't exceed {}", MAX_LIMIT));
        }
        if self.offset < 0 {
            violations.push("offset", "offset can't be negative");
        }
        if self.filter.status < 0 {
            violations.push("status", "status can't be negative");
        }
        violations.into_result()
    }
}

/// Requests that carry nothing but the path id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserId {
    #[serde(default)]
    pub id: String,
}

impl ApiRequest for UserId {
    const PATH_FIELDS: &'static [&'static str] = &["id"];

    fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Violations::new();
        check_id(&mut violations, &self.id);
        violations.into_result()
    }
}

/// Body of `PUT /users/{id}/password`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PasswordBody {
    #[schema(write_only, example = "correct horse battery staple")]
    pub password: String,
}

/// `PUT /users/{id}/password`: path id plus [`PasswordBody`]
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangePassword {
    pub id: String,
    pub password: String,
}

impl fmt::Debug for ChangePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePassword")
            .field("id", &self.id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ApiRequest for ChangePassword {
    const PATH_FIELDS: &'static [&'static str] = &["id"];

    fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Violations::new();
        check_id(&mut violations, &self.id);
        if self.password.is_empty() {
            violations.push("password", "password can't be empty");
        }
        violations.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::ErrorKind;

    fn valid_create() -> CreateUser {
        CreateUser {
            first_name: "t_firstName".into(),
            last_name: "t_lastName".into(),
            nick_name: "t_nickname".into(),
            password: "secret".into(),
            email: "t@email.com".into(),
            country: "CA".into(),
        }
    }

    #[test]
    fn test_status_wire_format_is_integer() {
        assert_eq!(serde_json::to_string(&UserStatus::Active).unwrap(), "1");
        assert_eq!(serde_json::to_string(&UserStatus::Inactive).unwrap(), "2");
        assert_eq!(
            serde_json::from_str::<UserStatus>("2").unwrap(),
            UserStatus::Inactive
        );
        assert!(serde_json::from_str::<UserStatus>("3").is_err());
        assert_eq!(UserStatus::default(), UserStatus::Active);
    }

    #[test]
    fn test_user_serializes_camel_case_with_inline_meta() {
        let now = Utc::now();
        let user = User {
            id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            nick_name: "ada".into(),
            email: "ada@example.com".into(),
            country: "UK".into(),
            status: UserStatus::Active,
            meta: Meta::fresh(now),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "u1");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["nickName"], "ada");
        assert_eq!(json["status"], 1);
        assert_eq!(json["version"], 0);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("meta").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_pagination_flags() {
        let first: Pagination<()> = Pagination::new(vec![], 2, 10, 0);
        assert!(!first.has_next);
        assert!(!first.has_previous);

        let middle: Pagination<()> = Pagination::new(vec![], 100, 10, 2);
        assert!(middle.has_next);
        assert!(middle.has_previous);

        let last: Pagination<()> = Pagination::new(vec![], 30, 10, 20);
        assert!(!last.has_next);
        assert!(last.has_previous);
    }

    #[test]
    fn test_pagination_json_field_names() {
        let page: Pagination<()> = Pagination::new(vec![], 0, 20, 0);
        let json = serde_json::to_value(&page).unwrap();
        for key in [
            "totalRecords",
            "limit",
            "offset",
            "hasNext",
            "hasPrevious",
            "items",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_create_valid() {
        assert!(ApiRequest::validate(&valid_create()).is_ok());
    }

    #[test]
    fn test_create_reports_every_violation() {
        let err = ApiRequest::validate(&CreateUser::default()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(
            err.message(),
            "country can't be empty;;email can't be empty;;firstName can't be empty;;\
             nickName can't be empty;;password can't be empty"
        );
    }

    #[test]
    fn test_create_rejects_malformed_email() {
        let input = CreateUser {
            email: "not-an-email".into(),
            ..valid_create()
        };
        let err = ApiRequest::validate(&input).unwrap_err();
        assert_eq!(err.message(), "email is not valid");
    }

    #[test]
    fn test_create_debug_redacts_password() {
        let debug = format!("{:?}", valid_create());
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_update_requires_id() {
        let input = UpdateUser {
            id: String::new(),
            patch: UserPatch::default(),
        };
        let err = ApiRequest::validate(&input).unwrap_err();
        assert_eq!(err.message(), "id can't be empty");
    }

    #[test]
    fn test_update_rejects_blank_fields_and_reactivation() {
        let input = UpdateUser {
            id: "u1".into(),
            patch: UserPatch {
                first_name: Some(String::new()),
                email: Some(String::new()),
                status: Some(UserStatus::Active),
                ..Default::default()
            },
        };
        let err = ApiRequest::validate(&input).unwrap_err();
        assert_eq!(
            err.message(),
            "email can't be empty;;firstName can't be empty;;status can only be set to 2 (inactive)"
        );
    }

    #[test]
    fn test_update_accepts_deactivation() {
        let input = UpdateUser {
            id: "u1".into(),
            patch: UserPatch {
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        };
        assert!(ApiRequest::validate(&input).is_ok());
    }

    #[test]
    fn test_update_decodes_flattened_patch() {
        let input: UpdateUser =
            serde_json::from_str(r#"{"id":"u1","nickName":"ada2","status":2}"#).unwrap();
        assert_eq!(input.id, "u1");
        assert_eq!(input.patch.nick_name.as_deref(), Some("ada2"));
        assert_eq!(input.patch.status, Some(UserStatus::Inactive));
        assert!(input.patch.first_name.is_none());
    }

    #[test]
    fn test_filter_decodes_query_strings() {
        let input: FilterUsers = serde_json::from_str(
            r#"{"country":"CA","status":"2","limit":"10","offset":"5"}"#,
        )
        .unwrap();
        assert_eq!(input.filter.country, "CA");
        assert_eq!(input.filter.status, 2);
        assert_eq!(input.limit, 10);
        assert_eq!(input.offset, 5);
    }

    #[test]
    fn test_filter_limit_defaults() {
        let input = FilterUsers::default();
        assert_eq!(input.effective_limit(), DEFAULT_LIMIT);
        assert!(ApiRequest::validate(&input).is_ok());
    }

    #[test]
    fn test_filter_rejects_negative_values() {
        let input = FilterUsers {
            limit: -1,
            offset: -1,
            filter: UserFilter {
                status: -1,
                ..Default::default()
            },
        };
        let err = ApiRequest::validate(&input).unwrap_err();
        assert_eq!(
            err.message(),
            "limit can't be negative;;offset can't be negative;;status can't be negative"
        );
    }

    #[test]
    fn test_filter_rejects_oversized_limit() {
        let input = FilterUsers {
            limit: MAX_LIMIT + 1,
            ..Default::default()
        };
        let err = ApiRequest::validate(&input).unwrap_err();
        assert_eq!(err.message(), "limit can't exceed 100");
    }

    #[test]
    fn test_change_password_requires_both_fields() {
        let err = ApiRequest::validate(&ChangePassword::default()).unwrap_err();
        assert_eq!(err.message(), "id can't be empty;;password can't be empty");
    }
}
