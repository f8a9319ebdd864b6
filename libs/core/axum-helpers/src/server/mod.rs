//! Server infrastructure.
//!
//! - Router assembly with OpenAPI documentation and common middleware
//! - Dependency health reporting
//! - Graceful shutdown with bounded cleanup
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router};
//!
//! let router = create_router::<ApiDoc>(api_routes, &server_config);
//! create_production_app(router, &server_config, async move { disconnect(client).await }).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router};
pub use health::{HealthCheckFuture, HealthReport, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
