//! Configuration management for the Harvest ERP backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ERP_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Report generation configuration
    pub reports: ReportsConfig,

    /// Storage backend selection
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Directory where generated PDF reports are written
    pub output_dir: String,

    /// Directory holding the font family used by the PDF builder
    pub fonts_dir: String,

    /// Font family name (file prefix inside `fonts_dir`)
    pub font_family: String,
}

/// Backend for the production batch store.
///
/// `memory` is a development/degraded mode that keeps batches in process
/// memory instead of Postgres.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BatchBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Which batch store implementation to wire at startup
    pub batches: BatchBackend,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("ERP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 4000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("reports.output_dir", "./reports")?
            .set_default("reports.fonts_dir", "./fonts")?
            .set_default("reports.font_family", "Roboto")?
            .set_default("storage.batches", "postgres")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ERP_ prefix)
            .add_source(
                Environment::with_prefix("ERP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
