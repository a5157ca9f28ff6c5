//! Typed application settings loaded from environment variables.
//!
//! Every section has sane defaults so a bare `gatehouse` start works against
//! a local SQLite file; production deployments override via `GATEHOUSE_*`
//! environment variables (a `.env` file is honored by the entry point).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{Error, Result};

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_var(name).and_then(|value| value.parse::<T>().ok()).unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env_var(name).map(|value| value.to_lowercase() == "true" || value == "1").unwrap_or(default)
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub api: ApiServerConfig,

    #[validate(nested)]
    pub database: DatabaseConfig,

    #[validate(nested)]
    pub auth: AuthConfig,

    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables and validate it.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api: ApiServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self)
            .map_err(|errors| Error::validation(format!("Invalid configuration: {}", errors)))?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }
        Ok(())
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiServerConfig {
    /// Bind address for the HTTP listener
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind_address: String,

    /// Listen port
    #[validate(range(min = 1, message = "Port must be non-zero"))]
    pub port: u16,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ApiServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_address: env_var("GATEHOUSE_API_BIND_ADDRESS")
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: env_parse("GATEHOUSE_API_PORT", 8080),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(min = 1, max = 60, message = "Connect timeout must be between 1 and 60 seconds"))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/gatehouse.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Create DatabaseConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env_parse("DATABASE_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_seconds: env_parse(
                "DATABASE_CONNECT_TIMEOUT_SECONDS",
                defaults.connect_timeout_seconds,
            ),
            idle_timeout_seconds: env_parse(
                "DATABASE_IDLE_TIMEOUT_SECONDS",
                defaults.idle_timeout_seconds,
            ),
            auto_migrate: env_bool("DATABASE_AUTO_MIGRATE", defaults.auto_migrate),
        }
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens. Required, minimum 32 bytes.
    #[serde(skip_serializing)]
    #[validate(length(min = 32, message = "Token secret must be at least 32 characters"))]
    pub token_secret: String,

    /// Bearer token lifetime in hours
    #[validate(range(min = 1, max = 720, message = "Token TTL must be between 1 and 720 hours"))]
    pub token_ttl_hours: i64,

    /// Per-call deadline applied to every store operation, in milliseconds
    #[validate(range(min = 100, max = 60_000, message = "Store deadline must be 100..=60000 ms"))]
    pub store_deadline_ms: u64,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let token_secret = env_var("GATEHOUSE_TOKEN_SECRET")
            .ok_or_else(|| Error::config("GATEHOUSE_TOKEN_SECRET is not set"))?;
        Ok(Self {
            token_secret,
            token_ttl_hours: env_parse("GATEHOUSE_TOKEN_TTL_HOURS", 24),
            store_deadline_ms: env_parse("GATEHOUSE_STORE_DEADLINE_MS", 5_000),
        })
    }

    /// Store operation deadline as a Duration
    pub fn store_deadline(&self) -> Duration {
        Duration::from_millis(self.store_deadline_ms)
    }
}

/// Observability configuration for logging output
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is not set
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logs: false }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env_var("GATEHOUSE_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: env_bool("GATEHOUSE_JSON_LOGS", defaults.json_logs),
        }
    }
}
