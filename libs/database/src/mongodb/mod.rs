//! MongoDB connector and utilities
//!
//! Provides connection management, health checks and error helpers.

mod config;
mod connector;
mod errors;
mod health;

pub use config::MongoConfig;
pub use connector::{
    MongoError, connect_from_config, connect_from_config_with_retry, disconnect, ping,
};
pub use errors::{DUPLICATE_KEY_CODE, is_duplicate_key};
pub use health::{HealthStatus, check_health_detailed};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
