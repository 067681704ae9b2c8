//! Configuration module for the Votes API.
//! Reads application settings from the environment and wires dependencies.
mod dependencies;

pub use dependencies::Dependencies;

use axum::http::{header, HeaderName, HeaderValue, Method};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use tower_http::cors::CorsLayer;
use votes_engine::engine::DEFAULT_MAX_ATTEMPTS;
use crate::errors::ApiError;

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_STATEMENT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Header carrying the id of the authenticated user, set by the upstream
/// auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_statement_timeout_ms: u64,
    pub run_migrations: bool,
    pub server_host: String,
    pub server_port: u16,
    pub vote_max_attempts: u32,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL connection URL (required)
    /// - `DB_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `DB_ACQUIRE_TIMEOUT_SECS`: Pool acquire timeout (default: 5)
    /// - `DB_STATEMENT_TIMEOUT_MS`: Per-statement timeout (default: 5000)
    /// - `RUN_MIGRATIONS`: Apply embedded migrations at startup (default: true)
    /// - `SERVER_HOST`: Bind host (default: 127.0.0.1)
    /// - `SERVER_PORT`: Bind port (default: 8080)
    /// - `VOTE_MAX_ATTEMPTS`: Attempts per vote before giving up on a race (default: 3)
    /// - `LOG_FORMAT`: "pretty" or "json" (default: pretty)
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Every variable present and parsable
    /// * `Err(ApiError::Config)` - A required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ApiError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ApiError::Config("DATABASE_URL must be set".to_string()))?;

        let vote_max_attempts = env_or("VOTE_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if vote_max_attempts == 0 {
            return Err(ApiError::Config(
                "VOTE_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            db_acquire_timeout_secs: env_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
            )?,
            db_statement_timeout_ms: env_or(
                "DB_STATEMENT_TIMEOUT_MS",
                DEFAULT_DB_STATEMENT_TIMEOUT_MS,
            )?,
            run_migrations: env_or("RUN_MIGRATIONS", true)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            vote_max_attempts,
            log_format: env_or("LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    /// Address the HTTP server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ApiError> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .map_err(|e| ApiError::Config(format!("invalid server address: {e}")))
    }
}

/// Reads `name` from the environment, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ApiError::Config(format!("invalid {name} '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

/// Create CORS layer for localhost development
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://127.0.0.1:5173"),
        ])
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
}
