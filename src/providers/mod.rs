pub mod builtin;
pub mod caching;
pub mod exchangerates;
pub mod local;
pub mod table;

use crate::core::config::{AppDirs, ExchangeRatesProviderConfig};
use crate::core::{ConfigOption, OptionKind, Source, SourceConfig, SourceError};
use anyhow::anyhow;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

const LOCAL_OPTIONS: &[ConfigOption] = &[ConfigOption {
    key: local::PATH_OPTION,
    kind: OptionKind::Path,
    label: "Exchange Rate Data Path",
    hint: "JSON files (*.json)",
    default: ".",
}];

const EXCHANGERATES_OPTIONS: &[ConfigOption] = &[ConfigOption {
    key: exchangerates::APIKEY_OPTION,
    kind: OptionKind::String,
    label: "API Key",
    hint: "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX",
    default: "",
}];

/// Registered sources, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Builtin,
    Local,
    ExchangeRatesIO,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Builtin,
        SourceKind::Local,
        SourceKind::ExchangeRatesIO,
    ];

    pub fn first() -> SourceKind {
        Self::ALL[0]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Builtin => "Builtin",
            SourceKind::Local => "Local",
            SourceKind::ExchangeRatesIO => "ExchangeRatesIO",
        }
    }

    /// Configuration options the user is asked for before the source is built.
    pub fn options(&self) -> &'static [ConfigOption] {
        match self {
            SourceKind::Builtin => &[],
            SourceKind::Local => LOCAL_OPTIONS,
            SourceKind::ExchangeRatesIO => EXCHANGERATES_OPTIONS,
        }
    }

    pub fn option(&self, key: &str) -> Option<&'static ConfigOption> {
        self.options().iter().find(|o| o.key == key)
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("Unknown source: {}", s))
    }
}

/// Builds sources with the settings and directories they need.
#[derive(Debug, Clone)]
pub struct SourceFactory {
    dirs: AppDirs,
    exchangerates_url: String,
    timeout: Duration,
}

impl SourceFactory {
    pub fn new(dirs: AppDirs, exchangerates: &ExchangeRatesProviderConfig) -> Self {
        Self {
            dirs,
            exchangerates_url: exchangerates.base_url.clone(),
            timeout: exchangerates.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn dirs(&self) -> &AppDirs {
        &self.dirs
    }

    pub fn create(
        &self,
        kind: SourceKind,
        config: SourceConfig,
    ) -> Result<Box<dyn Source>, SourceError> {
        Ok(match kind {
            SourceKind::Builtin => Box::new(builtin::Builtin::new(config)),
            SourceKind::Local => Box::new(local::Local::new(config)),
            SourceKind::ExchangeRatesIO => Box::new(exchangerates::ExchangeRatesIO::new(
                config,
                &self.exchangerates_url,
                self.timeout,
                self.dirs.source_cache_path(kind.name()),
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_lookup() {
        assert_eq!("Local".parse::<SourceKind>().unwrap(), SourceKind::Local);
        assert_eq!(
            "exchangeratesio".parse::<SourceKind>().unwrap(),
            SourceKind::ExchangeRatesIO
        );
        assert!("Yahoo".parse::<SourceKind>().is_err());
        assert_eq!(SourceKind::first(), SourceKind::Builtin);
    }

    #[test]
    fn test_source_options() {
        assert!(SourceKind::Builtin.options().is_empty());

        let path = SourceKind::Local.option("path").unwrap();
        assert_eq!(path.kind, OptionKind::Path);
        assert_eq!(path.hint, "JSON files (*.json)");

        let apikey = SourceKind::ExchangeRatesIO.option("apikey").unwrap();
        assert_eq!(apikey.kind, OptionKind::String);
        assert_eq!(apikey.label, "API Key");
        assert!(SourceKind::ExchangeRatesIO.option("path").is_none());
    }

    #[tokio::test]
    async fn test_create_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let factory = SourceFactory::new(
            AppDirs::new(dir.path().join("config"), dir.path().join("cache")),
            &ExchangeRatesProviderConfig::default(),
        );

        let mut source = factory
            .create(SourceKind::Builtin, SourceConfig::new())
            .unwrap();
        let (_, catalog) = source.available_currencies().await.unwrap();
        assert!(catalog.contains_key("EUR"));
    }
}
