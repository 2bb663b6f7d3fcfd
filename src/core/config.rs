use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

const DEFAULT_EXCHANGERATES_URL: &str = "https://api.apilayer.com/exchangerates_data";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRatesProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ExchangeRatesProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExchangeRatesProviderConfig {
    fn default() -> Self {
        ExchangeRatesProviderConfig {
            base_url: DEFAULT_EXCHANGERATES_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub exchangerates: ExchangeRatesProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub config_dir: Option<String>,
    pub cache_dir: Option<String>,
}

/// Roots under which per-source configuration and caches are persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AppDirs {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl AppDirs {
    pub fn new(config_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn source_config_path(&self, source: &str) -> PathBuf {
        self.config_dir.join(source).join("config.bin")
    }

    pub fn source_cache_path(&self, source: &str) -> PathBuf {
        self.cache_dir
            .join(source.to_lowercase())
            .join("cache.bin")
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "currencyconverter")
        .context("Could not determine project directories")
}

impl AppConfig {
    /// Loads settings from the default location, falling back to defaults
    /// when no settings file has been created.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No settings file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("settings.yaml"))
    }

    pub fn dirs(&self) -> Result<AppDirs> {
        let config_dir = match &self.config_dir {
            Some(custom_path) => PathBuf::from(custom_path),
            None => project_dirs()?.config_dir().to_path_buf(),
        };
        let cache_dir = match &self.cache_dir {
            Some(custom_path) => PathBuf::from(custom_path),
            None => project_dirs()?.cache_dir().to_path_buf(),
        };
        Ok(AppDirs::new(config_dir, cache_dir))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  exchangerates:
    base_url: "http://example.com/rates"
    timeout_secs: 3
config_dir: "/tmp/cc/config"
cache_dir: "/tmp/cc/cache"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.exchangerates.base_url,
            "http://example.com/rates"
        );
        assert_eq!(config.providers.exchangerates.timeout(), Duration::from_secs(3));

        let dirs = config.dirs().unwrap();
        assert_eq!(dirs.config_dir, PathBuf::from("/tmp/cc/config"));
        assert_eq!(
            dirs.source_config_path("Local"),
            PathBuf::from("/tmp/cc/config/Local/config.bin")
        );
        assert_eq!(
            dirs.source_cache_path("ExchangeRatesIO"),
            PathBuf::from("/tmp/cc/cache/exchangeratesio/cache.bin")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(
            config.providers.exchangerates.base_url,
            DEFAULT_EXCHANGERATES_URL
        );
        assert_eq!(config.providers.exchangerates.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.config_dir.is_none());

        let yaml_str = r#"
providers:
  exchangerates:
    base_url: "http://localhost:8080"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.providers.exchangerates.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
