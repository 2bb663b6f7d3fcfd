use crate::core::{Catalog, Conversion, ConvertedAmount, SourceError};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Currencies and rates relative to one implicit reference currency.
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    pub date: String,
    pub currencies: Catalog,
    pub rates: IndexMap<String, f64>,
}

impl RateTable {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let table: RateTable = serde_json::from_str(&text)?;
        debug!(
            currencies = table.currencies.len(),
            date = %table.date,
            "Loaded rate table from {}",
            path.display()
        );
        Ok(table)
    }

    fn rate(&self, code: &str) -> Result<f64, SourceError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| SourceError::UnknownCurrency(code.to_string()))
    }

    /// Converts `amount` of `base` into each target via the reference currency.
    pub fn convert(
        &self,
        base: &str,
        targets: &[String],
        amount: f64,
    ) -> Result<Conversion, SourceError> {
        let base_rate = self.rate(base)?;
        let results = targets
            .iter()
            .map(|code| {
                let rate = self.rate(code)? / base_rate;
                Ok(ConvertedAmount {
                    code: code.clone(),
                    amount: amount * rate,
                    rate,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        Ok(Conversion {
            label: self.date.clone(),
            results,
        })
    }
}
