//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! ## Modules
//!
//! - **[`errors`]**: The four-kind API error taxonomy and its wire format
//! - **[`pipeline`]**: Decode, validate, execute, respond for every endpoint
//! - **[`server`]**: Router assembly, health reporting, graceful shutdown
//! - **[`http`]**: Security headers and the static bearer-token gate
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use axum_helpers::{create_production_app, create_router, serve};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let api_routes = Router::new().route("/items", post(serve(create_item))).with_state(state);
//!     let router = create_router::<ApiDoc>(api_routes, &config);
//!     create_production_app(router, &config, async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod http;
pub mod pipeline;
pub mod server;

pub use errors::{ApiError, BoxError, ErrorKind, ErrorResponse};

pub use pipeline::{
    ApiRequest, HandlerResult, RequestContext, RequestTimeout, Violations, serve,
};

pub use server::{
    HealthCheckFuture, HealthReport, ShutdownCoordinator, create_production_app, create_router,
    run_health_checks, shutdown_signal,
};

pub use http::{StaticBearer, require_static_bearer, security_headers};
