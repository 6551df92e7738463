//! Configuration management for trafdash

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the analytics backend (paths are appended verbatim)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Retry and timeout settings for backend requests
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheSettings,

    /// Watch-mode polling settings
    #[serde(default)]
    pub refresh: RefreshSettings,

    /// Connectivity diagnostics settings
    #[serde(default)]
    pub probe: ProbeSettings,
}

/// Retry and timeout settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchSettings {
    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSettings {
    /// Time-to-live for cached responses, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

/// Watch-mode settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshSettings {
    /// Seconds between dashboard polls
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

/// Connectivity diagnostics settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeSettings {
    /// Candidate base URLs tried by `trafdash probe`
    #[serde(default = "default_probe_urls")]
    pub base_urls: Vec<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

fn default_ttl_secs() -> u64 {
    5 * 60
}

fn default_interval_secs() -> u64 {
    30
}

fn default_probe_urls() -> Vec<String> {
    vec![
        DEFAULT_BASE_URL.to_string(),
        "http://127.0.0.1:8080/api".to_string(),
    ]
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            timeout_ms: default_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            base_urls: default_probe_urls(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fetch: FetchSettings::default(),
            cache: CacheSettings::default(),
            refresh: RefreshSettings::default(),
            probe: ProbeSettings::default(),
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Config {
    /// Get the default config file path (~/.trafdash/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".trafdash").join("config.yaml"))
    }

    /// Resolve an optional override into a concrete config path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an explicit path, or the default location.
    ///
    /// A missing file at the default location yields the built-in defaults;
    /// a missing file at an explicit path is an error.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let resolved = Self::resolve_path(path)?;
        if path.is_none() && !resolved.exists() {
            log::debug!("No config at {}, using defaults", resolved.display());
            return Ok(Self::default());
        }
        Self::load_from(&resolved)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings that would make the fetch or cache policy meaningless
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()).into());
        }
        if self.fetch.max_attempts == 0 {
            return Err(
                ConfigError::Invalid("fetch.max_attempts must be at least 1".to_string()).into(),
            );
        }
        if self.fetch.timeout_ms == 0 {
            return Err(
                ConfigError::Invalid("fetch.timeout_ms must be greater than 0".to_string()).into(),
            );
        }
        if self.cache.ttl_secs == 0 {
            return Err(
                ConfigError::Invalid("cache.ttl_secs must be greater than 0".to_string()).into(),
            );
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh.interval_secs must be greater than 0".to_string(),
            )
            .into());
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    /// Apply runtime overrides from CLI flags or environment
    pub fn apply_overrides(
        &mut self,
        base_url: Option<&str>,
        timeout_ms: Option<u64>,
        max_attempts: Option<u32>,
    ) {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = timeout_ms {
            self.fetch.timeout_ms = ms;
        }
        if let Some(n) = max_attempts {
            self.fetch.max_attempts = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.refresh.interval_secs, 30);
        assert_eq!(config.probe.base_urls.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "base_url: http://backend:9000/api\nfetch:\n  max_attempts: 5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.base_url, "http://backend:9000/api");
        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.timeout_ms, 30_000);
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.fetch.max_attempts = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = Config::default();
        config.cache.ttl_secs = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.base_url = "http://10.0.0.5:8080/api".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_at_explicit_missing_path_is_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yaml");

        let err = Config::load_at(Some(path.to_str().unwrap())).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::NotFound)
        ));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "fetch:\n  timeout_ms: 0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("http://other:8080/api/"), Some(500), Some(1));

        assert_eq!(config.base_url, "http://other:8080/api");
        assert_eq!(config.fetch.timeout_ms, 500);
        assert_eq!(config.fetch.max_attempts, 1);
    }
}
