//! Configuration loading and validation.

mod settings;

pub use settings::{
    ApiServerConfig, AppConfig, AuthConfig, DatabaseConfig, ObservabilityConfig,
};
