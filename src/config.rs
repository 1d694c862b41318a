use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::game::MAX_HISTORY;
use crate::domain::seats::SEAT_TIMEOUT_SECS;

pub const CONFIG_PATH: &str = "Config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub state_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub seat_timeout_secs: i64,
    pub max_history: usize,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    pub state_limit: u32,
    pub mutation_limit: u32,
    pub window_secs: u64,
    pub max_buckets: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(Path::new(CONFIG_PATH))?;
        config.merge_env();

        info!(
            host = %config.api.host,
            port = config.api.port,
            state_file = %config.storage.state_file.display(),
            seat_timeout_secs = config.session.seat_timeout_secs,
            max_history = config.session.max_history,
            state_limit = config.rate_limit.state_limit,
            mutation_limit = config.rate_limit.mutation_limit,
            window_secs = config.rate_limit.window_secs,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("BOARDHALL_API_HOST") {
            if !val.is_empty() {
                self.api.host = val;
            }
        }
        if let Ok(val) = std::env::var("BOARDHALL_API_PORT") {
            if let Ok(parsed) = val.parse() {
                self.api.port = parsed;
            }
        }
        if let Ok(val) = std::env::var("BOARDHALL_STATE_FILE") {
            if !val.is_empty() {
                self.storage.state_file = PathBuf::from(val);
            }
        }
        if let Ok(val) = std::env::var("BOARDHALL_SEAT_TIMEOUT_SECS") {
            if let Ok(parsed) = val.parse() {
                self.session.seat_timeout_secs = parsed;
            }
        }
        if let Ok(val) = std::env::var("BOARDHALL_MAX_HISTORY") {
            if let Ok(parsed) = val.parse() {
                self.session.max_history = parsed;
            }
        }
        if let Ok(val) = std::env::var("BOARDHALL_STATE_RATE_LIMIT") {
            if let Ok(parsed) = val.parse() {
                self.rate_limit.state_limit = parsed;
            }
        }
        if let Ok(val) = std::env::var("BOARDHALL_MUTATION_RATE_LIMIT") {
            if let Ok(parsed) = val.parse() {
                self.rate_limit.mutation_limit = parsed;
            }
        }
        if let Ok(val) = std::env::var("BOARDHALL_RATE_WINDOW_SECS") {
            if let Ok(parsed) = val.parse() {
                self.rate_limit.window_secs = parsed;
            }
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}
impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("gamestate.json"),
        }
    }
}
impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seat_timeout_secs: SEAT_TIMEOUT_SECS,
            max_history: MAX_HISTORY,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            state_limit: 240,
            mutation_limit: 30,
            window_secs: 60,
            max_buckets: crate::infrastructure::limiter::MAX_BUCKETS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    struct EnvVarGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn new(key: &str, value: &str) -> Self {
            let original = env::var(key).ok();
            unsafe {
                env::set_var(key, value);
            }
            Self {
                key: key.to_string(),
                original,
            }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            unsafe {
                match &self.original {
                    Some(val) => env::set_var(&self.key, val),
                    None => env::remove_var(&self.key),
                }
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.session.seat_timeout_secs, 300);
        assert_eq!(config.session.max_history, 200);
        assert_eq!(config.rate_limit.state_limit, 240);
        assert_eq!(config.rate_limit.mutation_limit, 30);
        assert_eq!(config.storage.state_file, PathBuf::from("gamestate.json"));
    }

    #[test]
    fn test_merge_env_overrides() {
        let mut config = AppConfig::default();

        let _g1 = EnvVarGuard::new("BOARDHALL_API_PORT", "8888");
        let _g2 = EnvVarGuard::new("BOARDHALL_SEAT_TIMEOUT_SECS", "42");
        let _g3 = EnvVarGuard::new("BOARDHALL_STATE_FILE", "/tmp/other.json");
        let _g4 = EnvVarGuard::new("BOARDHALL_MUTATION_RATE_LIMIT", "5");

        config.merge_env();

        assert_eq!(config.api.port, 8888);
        assert_eq!(config.session.seat_timeout_secs, 42);
        assert_eq!(config.storage.state_file, PathBuf::from("/tmp/other.json"));
        assert_eq!(config.rate_limit.mutation_limit, 5);
    }

    #[test]
    fn test_invalid_env_vars_ignored() {
        let mut config = AppConfig::default();
        let _g1 = EnvVarGuard::new("BOARDHALL_MAX_HISTORY", "not_a_number");

        config.merge_env();

        assert_eq!(config.session.max_history, 200);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = 9001\n\n[session]\nseat_timeout_secs = 60").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.api.port, 9001);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.session.seat_timeout_secs, 60);
        assert_eq!(config.session.max_history, 200);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nport = ").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::from_file(Path::new("/nonexistent/boardhall/Config.toml")).unwrap();
        assert_eq!(config.api.port, 8000);
    }
}
