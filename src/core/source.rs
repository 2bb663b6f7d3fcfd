//! Exchange-rate source abstractions and core types

use super::error::SourceError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Currency code to display name, in the order the source reports them.
pub type Catalog = IndexMap<String, String>;

/// Option key to value, as resolved by the configuration store.
pub type SourceConfig = BTreeMap<String, ConfigValue>;

/// Currency preferred as the initial base currency.
pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ConfigValue {
    String(String),
    Path(PathBuf),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            ConfigValue::Path(p) => p.to_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Path,
    String,
}

/// Describes how to ask the user for one configuration option.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    pub key: &'static str,
    pub kind: OptionKind,
    pub label: &'static str,
    /// Placeholder text for strings, file type filter for paths.
    pub hint: &'static str,
    pub default: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedAmount {
    pub code: String,
    pub amount: f64,
    pub rate: f64,
}

/// Outcome of a conversion. On recoverable failures `label` carries the
/// error kind and `results` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub label: String,
    pub results: Vec<ConvertedAmount>,
}

impl Conversion {
    pub fn failed(error: &SourceError) -> Self {
        Self {
            label: error.kind().to_string(),
            results: Vec::new(),
        }
    }
}

/// Position of [`DEFAULT_CURRENCY`] in the catalog's key order, or 0.
pub fn default_index(catalog: &Catalog) -> usize {
    catalog.get_index_of(DEFAULT_CURRENCY).unwrap_or(0)
}

/// Base and target currencies selected by the user for one source instance.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub base: String,
    targets: Vec<String>,
}

impl Selection {
    pub fn add_target(&mut self, code: &str) {
        if !self.targets.iter().any(|t| t == code) {
            self.targets.push(code.to_string());
        }
    }

    pub fn remove_target(&mut self, code: &str) {
        self.targets.retain(|t| t != code);
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Picks the default base currency from a freshly fetched catalog.
    pub fn reset_base(&mut self, catalog: &Catalog) -> usize {
        let index = default_index(catalog);
        self.base = catalog
            .get_index(index)
            .map(|(code, _)| code.clone())
            .unwrap_or_default();
        index
    }
}

#[async_trait]
pub trait Source: Send {
    /// Flushes in-memory state to persistent storage.
    async fn close(&mut self);

    async fn available_currencies(&mut self) -> Result<(usize, Catalog), SourceError>;

    fn add_target_currency(&mut self, code: &str);

    fn remove_target_currency(&mut self, code: &str);

    fn source_currency(&mut self, code: &str);

    async fn convert(&mut self, amount: f64) -> Conversion;

    async fn config_changed(&mut self) -> Result<(), SourceError>;

    fn config(&self) -> &SourceConfig;

    fn config_mut(&mut self) -> &mut SourceConfig;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(codes: &[&str]) -> Catalog {
        codes
            .iter()
            .map(|c| (c.to_string(), format!("{c} name")))
            .collect()
    }

    #[test]
    fn test_default_index_prefers_eur() {
        assert_eq!(default_index(&catalog(&["AUD", "EUR", "USD"])), 1);
        assert_eq!(default_index(&catalog(&["AUD", "USD"])), 0);
        assert_eq!(default_index(&Catalog::new()), 0);
    }

    #[test]
    fn test_selection_targets_keep_add_order() {
        let mut selection = Selection::default();
        selection.add_target("USD");
        selection.add_target("GBP");
        selection.add_target("USD");
        selection.add_target("JPY");
        selection.remove_target("CHF");
        selection.remove_target("GBP");

        assert_eq!(selection.targets(), ["USD", "JPY"]);
    }

    #[test]
    fn test_reset_base() {
        let mut selection = Selection::default();
        assert_eq!(selection.reset_base(&catalog(&["AUD", "EUR"])), 1);
        assert_eq!(selection.base, "EUR");

        assert_eq!(selection.reset_base(&catalog(&["AUD", "USD"])), 0);
        assert_eq!(selection.base, "AUD");

        selection.reset_base(&Catalog::new());
        assert_eq!(selection.base, "");
    }

    #[test]
    fn test_config_value_serialization() {
        let mut config = SourceConfig::new();
        config.insert("apikey".into(), ConfigValue::String("secret".into()));
        config.insert("path".into(), ConfigValue::Path(PathBuf::from("/tmp/rates.json")));

        let bytes = serde_json::to_vec(&config).unwrap();
        let restored: SourceConfig = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(restored, config);
    }
}
