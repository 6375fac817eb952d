use anyhow::{Context, Result};

use crate::resume::reveal::DEFAULT_TICK;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub google_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Per-character reveal cadence in milliseconds.
    pub reveal_tick_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            google_api_key: require_env("GOOGLE_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            reveal_tick_ms: match std::env::var("REVEAL_TICK_MS") {
                Ok(value) => value
                    .parse::<u64>()
                    .context("REVEAL_TICK_MS must be a number of milliseconds")?,
                Err(_) => DEFAULT_TICK.as_millis() as u64,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
