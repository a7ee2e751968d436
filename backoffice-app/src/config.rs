//! Configuration loading from environment.

use std::env;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub rate_limit_rpm: Option<u32>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let rate_limit_rpm = match env::var("RATE_LIMIT_RPM") {
            Ok(value) => Some(value.parse()?),
            Err(_) => None,
        };

        Ok(Self {
            port,
            database_url,
            rate_limit_rpm,
        })
    }
}
