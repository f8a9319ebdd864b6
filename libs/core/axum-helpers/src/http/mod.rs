//! HTTP middleware.
//!
//! - Security headers on every response
//! - Static bearer-token gate
//!
//! ```ignore
//! use axum_helpers::http::{StaticBearer, require_static_bearer, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(axum::middleware::from_fn_with_state(
//!         StaticBearer::new(token),
//!         require_static_bearer,
//!     ));
//! ```

pub mod auth;
pub mod security;

pub use auth::{StaticBearer, require_static_bearer};
pub use security::security_headers;
