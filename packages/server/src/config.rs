use std::env;

use dotenvy::dotenv;

use crate::common::Error;

/// Database connection parameters, resolved once at process start.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    /// Load connection parameters from `DB_*` environment variables.
    ///
    /// A missing required variable is a startup-fatal configuration error.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            host: require("DB_HOST")?,
            port: env::var("DB_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()
                .map_err(|_| Error::Configuration("DB_PORT must be a valid port number".into()))?,
            database: require("DB_NAME")?,
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
        })
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub port: u16,
    /// Base URL of the external reasoning agent service.
    pub agent_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| Error::Configuration("PORT must be a valid number".into()))?,
            agent_base_url: require("AGENT_BASE_URL")?,
        })
    }
}

fn require(key: &str) -> Result<String, Error> {
    env::var(key).map_err(|_| Error::Configuration(format!("{key} must be set")))
}
