use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/dashshell/config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("{field} = {value} is out of range ({min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i128,
        min: i64,
        max: i64,
    },
}

/// Upper bounds for lifetimes taken from config.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;
pub const MAX_REMEMBER_DAYS: i64 = 3650;
pub const MAX_COOKIE_AGE_DAYS: i64 = 3650;
pub const MAX_PURGE_INTERVAL_SECS: i64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Honour `X-Forwarded-Proto`, `X-Real-IP` and `X-Forwarded-For`. Only
    /// enable when dashd sits behind a proxy that overwrites them.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Where unauthenticated dashboard requests are sent.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    #[serde(default = "default_remember_days")]
    pub remember_days: u64,
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
    /// Domain attached to the session cookie when served over https.
    #[serde(default)]
    pub cookie_domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_cookie_max_age_days")]
    pub cookie_max_age_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

// Default functions
fn default_bind() -> String {
    "0.0.0.0:4000".to_string()
}
fn default_database_path() -> String {
    "/var/lib/dashshell/auth.db".to_string()
}
fn default_login_path() -> String {
    "/auth/login".to_string()
}
fn default_session_cookie() -> String {
    "auth_session".to_string()
}
fn default_session_ttl_hours() -> u64 {
    24
}
fn default_remember_days() -> u64 {
    30
}
fn default_purge_interval() -> u64 {
    3600
}
fn default_cookie_max_age_days() -> i64 {
    7
}
fn default_log_filter() -> String {
    "dashd=info,dash_api=info,dash_shell=info,dash_auth=info,tower_http=info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            trust_proxy_headers: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            login_path: default_login_path(),
            session_cookie: default_session_cookie(),
            session_ttl_hours: default_session_ttl_hours(),
            remember_days: default_remember_days(),
            purge_interval_secs: default_purge_interval(),
            cookie_domain: None,
        }
    }
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            cookie_max_age_days: default_cookie_max_age_days(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `$DASH_CONFIG_PATH` (or the default path), falling back to
    /// defaults when the file does not exist, then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reject lifetimes and intervals that are zero, negative or too large
    /// to turn into durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "auth.session_ttl_hours",
            i128::from(self.auth.session_ttl_hours),
            MAX_SESSION_TTL_HOURS,
        )?;
        check_range(
            "auth.remember_days",
            i128::from(self.auth.remember_days),
            MAX_REMEMBER_DAYS,
        )?;
        check_range(
            "auth.purge_interval_secs",
            i128::from(self.auth.purge_interval_secs),
            MAX_PURGE_INTERVAL_SECS,
        )?;
        check_range(
            "preferences.cookie_max_age_days",
            i128::from(self.preferences.cookie_max_age_days),
            MAX_COOKIE_AGE_DAYS,
        )?;
        Ok(())
    }

    /// Apply `DASH_*` overrides. The lookup is injected so tests do not
    /// touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("DASH_BIND") {
            self.server.bind = bind;
        }
        if let Some(trust) = lookup("DASH_TRUST_PROXY") {
            self.server.trust_proxy_headers = parse_bool("DASH_TRUST_PROXY", trust)?;
        }
        if let Some(path) = lookup("DASH_DATABASE_PATH") {
            self.auth.database_path = path;
        }
        if let Some(filter) = lookup("DASH_LOG") {
            self.logging.filter = filter;
        }
        if let Some(json) = lookup("DASH_LOG_JSON") {
            self.logging.json = parse_bool("DASH_LOG_JSON", json)?;
        }
        Ok(())
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ConfigError::InvalidEnv { var, value }),
    }
}

fn check_range(field: &'static str, value: i128, max: i64) -> Result<(), ConfigError> {
    if value < 1 || value > i128::from(max) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 1,
            max,
        });
    }
    Ok(())
}

pub fn config_path() -> PathBuf {
    PathBuf::from(
        std::env::var("DASH_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:4000");
        assert_eq!(config.auth.login_path, "/auth/login");
        assert_eq!(config.auth.session_cookie, "auth_session");
        assert_eq!(config.auth.session_ttl_hours, 24);
        assert_eq!(config.preferences.cookie_max_age_days, 7);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nbind = \"127.0.0.1:8080\"\n\n[auth]\nremember_days = 14\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.auth.remember_days, 14);
        assert_eq!(config.auth.login_path, "/auth/login");
        assert_eq!(config.preferences.cookie_max_age_days, 7);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[server\nbind = ").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DASH_BIND", "127.0.0.1:9000"),
            ("DASH_DATABASE_PATH", "/tmp/auth.db"),
            ("DASH_LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.auth.database_path, "/tmp/auth.db");
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_rejects_bad_bool() {
        let mut config = Config::default();
        let err = config
            .apply_env(|var| (var == "DASH_LOG_JSON").then(|| "yes".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "DASH_LOG_JSON", .. }));
    }

    #[test]
    fn test_defaults_are_valid() {
        Config::default().validate().unwrap();
        assert!(!Config::default().server.trust_proxy_headers);
    }

    #[test]
    fn test_env_trust_proxy() {
        let mut config = Config::default();
        config
            .apply_env(|var| (var == "DASH_TRUST_PROXY").then(|| "1".to_string()))
            .unwrap();
        assert!(config.server.trust_proxy_headers);
    }

    #[test]
    fn test_rejects_out_of_range_lifetimes() {
        let mut config = Config::default();
        config.auth.session_ttl_hours = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "auth.session_ttl_hours", .. }));

        let mut config = Config::default();
        config.auth.session_ttl_hours = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.remember_days = 200_000_000;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "auth.remember_days", .. }));

        let mut config = Config::default();
        config.auth.purge_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_cookie_age() {
        for days in [0, -1, i64::MIN, MAX_COOKIE_AGE_DAYS + 1] {
            let mut config = Config::default();
            config.preferences.cookie_max_age_days = days;
            let err = config.validate().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::OutOfRange { field: "preferences.cookie_max_age_days", .. }
            ));
        }
    }

    #[test]
    fn test_load_from_file_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[preferences]\ncookie_max_age_days = -3\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert!(config.validate().is_err());
    }
}
