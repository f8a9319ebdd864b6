//! Configuration for Users API

use axum_helpers::StaticBearer;
use core_config::{env_optional, env_parse, server::ServerConfig, FromEnv};
use database::mongodb::MongoConfig;
use std::time::Duration;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Upper bound for index creation at startup
    pub index_timeout: Duration,
    /// Stub bearer check for the user routes, enabled by `API_STATIC_TOKEN`
    pub static_token: Option<StaticBearer>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let index_timeout = Duration::from_secs(env_parse("INDEX_TIMEOUT_SECS", 10u64)?);
        let static_token = env_optional("API_STATIC_TOKEN").map(StaticBearer::new);

        Ok(Self {
            mongodb,
            server,
            environment,
            index_timeout,
            static_token,
        })
    }
}
