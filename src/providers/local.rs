//! Exchange rates loaded from a user-chosen JSON file.

use super::table::RateTable;
use crate::core::source::Selection;
use crate::core::{Catalog, ConfigValue, Conversion, Source, SourceConfig, SourceError};
use async_trait::async_trait;
use std::path::PathBuf;

pub const PATH_OPTION: &str = "path";

pub struct Local {
    config: SourceConfig,
    table: Option<RateTable>,
    selection: Selection,
}

impl Local {
    /// Creates the source without touching the file. Data is read by
    /// [`Source::config_changed`].
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            table: None,
            selection: Selection::default(),
        }
    }

    fn data_path(&self) -> Result<PathBuf, SourceError> {
        match self.config.get(PATH_OPTION) {
            Some(ConfigValue::Path(path)) => Ok(path.clone()),
            Some(ConfigValue::String(path)) => Ok(PathBuf::from(path)),
            None => Err(SourceError::MissingOption(PATH_OPTION.to_string())),
        }
    }

    fn table(&self) -> Result<&RateTable, SourceError> {
        self.table.as_ref().ok_or(SourceError::NotLoaded)
    }
}

#[async_trait]
impl Source for Local {
    async fn close(&mut self) {}

    async fn available_currencies(&mut self) -> Result<(usize, Catalog), SourceError> {
        let catalog = self.table()?.currencies.clone();
        let index = self.selection.reset_base(&catalog);
        Ok((index, catalog))
    }

    fn add_target_currency(&mut self, code: &str) {
        self.selection.add_target(code);
    }

    fn remove_target_currency(&mut self, code: &str) {
        self.selection.remove_target(code);
    }

    fn source_currency(&mut self, code: &str) {
        self.selection.base = code.to_string();
    }

    async fn convert(&mut self, amount: f64) -> Conversion {
        self.table()
            .and_then(|table| table.convert(&self.selection.base, self.selection.targets(), amount))
            .unwrap_or_else(|e| Conversion::failed(&e))
    }

    async fn config_changed(&mut self) -> Result<(), SourceError> {
        let path = self.data_path()?;
        // A failed reload drops the previous data rather than keeping a stale table.
        self.table = None;
        self.table = Some(RateTable::load(&path)?);
        Ok(())
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SourceConfig {
        &mut self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RATES_JSON: &str = r#"{
        "date": "2024-01-01",
        "currencies": {"EUR": "Euro", "USD": "Dollar"},
        "rates": {"EUR": 1.0, "USD": 1.1}
    }"#;

    fn write_rates(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn config_for(path: &std::path::Path) -> SourceConfig {
        let mut config = SourceConfig::new();
        config.insert(PATH_OPTION.into(), ConfigValue::Path(path.to_path_buf()));
        config
    }

    #[tokio::test]
    async fn test_load_and_convert() {
        let file = write_rates(RATES_JSON);
        let mut source = Local::new(config_for(file.path()));
        source.config_changed().await.unwrap();

        let (index, catalog) = source.available_currencies().await.unwrap();
        assert_eq!(index, 0);
        assert_eq!(catalog.get("USD").unwrap(), "Dollar");

        source.add_target_currency("USD");
        let conversion = source.convert(100.0).await;

        assert_eq!(conversion.label, "2024-01-01");
        assert_eq!(conversion.results.len(), 1);
        assert_eq!(conversion.results[0].code, "USD");
        assert!((conversion.results[0].amount - 110.0).abs() < 1e-9);
        assert!((conversion.results[0].rate - 1.1).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_default_index_follows_document_order() {
        let file = write_rates(
            r#"{"date": "d", "currencies": {"USD": "Dollar", "GBP": "Pound", "EUR": "Euro"},
                "rates": {"USD": 1.1, "GBP": 0.9, "EUR": 1.0}}"#,
        );
        let mut source = Local::new(config_for(file.path()));
        source.config_changed().await.unwrap();

        let (index, _) = source.available_currencies().await.unwrap();
        assert_eq!(index, 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let mut source = Local::new(config_for(std::path::Path::new("/nonexistent/rates.json")));
        let err = source.config_changed().await.unwrap_err();
        assert_eq!(err.kind(), "IoError");

        let err = source.available_currencies().await.unwrap_err();
        assert_eq!(err.kind(), "NotLoaded");

        source.add_target_currency("USD");
        assert_eq!(source.convert(1.0).await.label, "NotLoaded");
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let file = write_rates(r#"{"date": "2024-01-01", "currencies": {}}"#);
        let mut source = Local::new(config_for(file.path()));
        let err = source.config_changed().await.unwrap_err();
        assert_eq!(err.kind(), "ParseError");
    }

    #[tokio::test]
    async fn test_missing_path_option() {
        let mut source = Local::new(SourceConfig::new());
        let err = source.config_changed().await.unwrap_err();
        assert!(matches!(err, SourceError::MissingOption(key) if key == PATH_OPTION));
    }

    #[tokio::test]
    async fn test_reload_on_config_change() {
        let first = write_rates(RATES_JSON);
        let second = write_rates(
            r#"{"date": "2024-02-01", "currencies": {"EUR": "Euro", "CHF": "Franc"},
                "rates": {"EUR": 1.0, "CHF": 0.95}}"#,
        );
        let mut source = Local::new(config_for(first.path()));
        source.config_changed().await.unwrap();

        source.config_mut().insert(
            PATH_OPTION.into(),
            ConfigValue::Path(second.path().to_path_buf()),
        );
        source.config_changed().await.unwrap();

        let (_, catalog) = source.available_currencies().await.unwrap();
        assert!(catalog.contains_key("CHF"));
        assert!(!catalog.contains_key("USD"));

        source.add_target_currency("CHF");
        let conversion = source.convert(10.0).await;
        assert_eq!(conversion.label, "2024-02-01");
        assert!((conversion.results[0].amount - 9.5).abs() < 1e-9);
    }
}
