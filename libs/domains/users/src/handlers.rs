use axum::{
    Router,
    http::StatusCode,
    routing::{get, post, put},
};
use axum_helpers::{
    ApiError, HandlerResult, RequestContext,
    errors::handlers::not_found,
    errors::responses::{
        BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    serve,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    ChangePassword, CreateUser, FilterUsers, Pagination, PasswordBody, User, UserFilter, UserId,
    UserPatch, UpdateUser,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "Users";

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_user,
        filter_users,
        get_user,
        update_user,
        delete_user,
        change_password,
    ),
    components(
        schemas(User, CreateUser, UserPatch, UserFilter, Pagination<User>, PasswordBody),
        responses(
            BadRequestResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User record management endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<UserService<R>>;

/// Create the user router with all HTTP endpoints
///
/// Mount it with [`Router::nest_service`] so that `/users/` (an empty id
/// segment) reaches the `/` route, where the id decodes empty and fails
/// validation instead of falling through to a 404.
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            post(serve(create_user::<R>))
                .get(serve(get_user::<R>))
                .put(serve(update_user::<R>))
                .delete(serve(delete_user::<R>)),
        )
        .route("/filter", post(serve(filter_users::<R>)))
        .route(
            "/{id}",
            get(serve(get_user::<R>))
                .put(serve(update_user::<R>))
                .delete(serve(delete_user::<R>)),
        )
        .route("/{id}/password", put(serve(change_password::<R>)))
        .fallback(not_found)
        .with_state(shared_service)
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    service: SharedService<R>,
    ctx: RequestContext,
    input: CreateUser,
) -> HandlerResult<User> {
    let user = service.create_user(input).await.map_err(ApiError::from)?;

    tracing::info!(request_id = %ctx.request_id(), user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, user))
}

/// List users matching a filter, one page at a time
///
/// Inactive users are only returned when `status` is explicitly 2.
#[utoipa::path(
    post,
    path = "/filter",
    tag = TAG,
    request_body = UserFilter,
    params(
        ("limit" = Option<i64>, Query, description = "Page size, 1-100 (default 20)"),
        ("offset" = Option<i64>, Query, description = "Records to skip (default 0)")
    ),
    responses(
        (status = 200, description = "One page of matching users", body = Pagination<User>),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn filter_users<R: UserRepository>(
    service: SharedService<R>,
    _ctx: RequestContext,
    input: FilterUsers,
) -> HandlerResult<Pagination<User>> {
    let page = service.list_users(input).await.map_err(ApiError::from)?;
    Ok((StatusCode::OK, page))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    service: SharedService<R>,
    _ctx: RequestContext,
    input: UserId,
) -> HandlerResult<User> {
    let user = service.get_user_by_id(&input.id).await.map_err(ApiError::from)?;
    Ok((StatusCode::OK, user))
}

/// Update a user
///
/// Only the provided fields change. The password is changed through its own endpoint.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated successfully", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    service: SharedService<R>,
    _ctx: RequestContext,
    input: UpdateUser,
) -> HandlerResult<User> {
    let (id, patch) = input.into_parts();
    let user = service
        .update_user_by_id(&id, patch)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::OK, user))
}

/// Deactivate a user
///
/// Soft delete: the record stays, with status 2. Repeating the call succeeds.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated, empty object body"),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    service: SharedService<R>,
    ctx: RequestContext,
    input: UserId,
) -> HandlerResult<()> {
    service
        .delete_user_by_id(&input.id)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(request_id = %ctx.request_id(), user_id = %input.id, "User deactivated");
    Ok((StatusCode::OK, ()))
}

/// Change a user's password
#[utoipa::path(
    put,
    path = "/{id}/password",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = PasswordBody,
    responses(
        (status = 200, description = "Password changed, empty object body"),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn change_password<R: UserRepository>(
    service: SharedService<R>,
    _ctx: RequestContext,
    input: ChangePassword,
) -> HandlerResult<()> {
    service
        .change_password(&input.id, &input.password)
        .await
        .map_err(ApiError::from)?;
    Ok((StatusCode::OK, ()))
}
