pub mod config;

pub use config::{AuthConfig, Config, ConfigError, LoggingConfig, PreferencesConfig, ServerConfig};
