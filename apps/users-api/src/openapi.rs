//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        version = "0.1.0",
        description = "User record management backed by MongoDB. Every `/users` route is also served under `/api/users`.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(crate::api::health::health),
    components(schemas(axum_helpers::HealthReport)),
    nest(
        (path = "/users", api = domain_users::ApiDoc)
    ),
    tags(
        (name = "Users", description = "User record management endpoints"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;
