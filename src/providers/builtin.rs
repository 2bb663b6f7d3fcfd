//! Fixed exchange-rate table compiled into the binary.

use super::table::RateTable;
use crate::core::source::Selection;
use crate::core::{Catalog, Conversion, Source, SourceConfig, SourceError};
use async_trait::async_trait;

pub const BUILTIN_DATE: &str = "2024-01-02";

/// Code, name and rate per euro.
const BUILTIN_RATES: &[(&str, &str, f64)] = &[
    ("AUD", "Australian Dollar", 1.6154),
    ("BGN", "Bulgarian Lev", 1.9558),
    ("BRL", "Brazilian Real", 5.3499),
    ("CAD", "Canadian Dollar", 1.4577),
    ("CHF", "Swiss Franc", 0.9305),
    ("CNY", "Chinese Yuan", 7.8109),
    ("CZK", "Czech Koruna", 24.670),
    ("DKK", "Danish Krone", 7.4553),
    ("EUR", "Euro", 1.0),
    ("GBP", "British Pound Sterling", 0.86518),
    ("HKD", "Hong Kong Dollar", 8.5577),
    ("HUF", "Hungarian Forint", 378.90),
    ("IDR", "Indonesian Rupiah", 16996.47),
    ("ILS", "Israeli New Shekel", 3.9729),
    ("INR", "Indian Rupee", 91.2040),
    ("ISK", "Icelandic Krona", 150.90),
    ("JPY", "Japanese Yen", 155.76),
    ("KRW", "South Korean Won", 1429.20),
    ("MXN", "Mexican Peso", 18.6362),
    ("MYR", "Malaysian Ringgit", 5.0455),
    ("NOK", "Norwegian Krone", 11.2090),
    ("NZD", "New Zealand Dollar", 1.7425),
    ("PHP", "Philippine Peso", 60.833),
    ("PLN", "Polish Zloty", 4.3395),
    ("RON", "Romanian Leu", 4.9721),
    ("SEK", "Swedish Krona", 11.1140),
    ("SGD", "Singapore Dollar", 1.4518),
    ("THB", "Thai Baht", 37.641),
    ("TRY", "Turkish Lira", 32.6049),
    ("USD", "United States Dollar", 1.0956),
    ("ZAR", "South African Rand", 20.2048),
];

pub struct Builtin {
    config: SourceConfig,
    table: RateTable,
    selection: Selection,
}

impl Builtin {
    pub fn new(config: SourceConfig) -> Self {
        let table = RateTable {
            date: BUILTIN_DATE.to_string(),
            currencies: BUILTIN_RATES
                .iter()
                .map(|(code, name, _)| (code.to_string(), name.to_string()))
                .collect(),
            rates: BUILTIN_RATES
                .iter()
                .map(|(code, _, rate)| (code.to_string(), *rate))
                .collect(),
        };
        Self {
            config,
            table,
            selection: Selection::default(),
        }
    }

    pub fn rate_of(code: &str) -> Option<f64> {
        BUILTIN_RATES
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, _, rate)| *rate)
    }
}

#[async_trait]
impl Source for Builtin {
    async fn close(&mut self) {}

    async fn available_currencies(&mut self) -> Result<(usize, Catalog), SourceError> {
        let index = self.selection.reset_base(&self.table.currencies);
        Ok((index, self.table.currencies.clone()))
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
        self.table
            .convert(&self.selection.base, self.selection.targets(), amount)
            .unwrap_or_else(|e| Conversion::failed(&e))
    }

    async fn config_changed(&mut self) -> Result<(), SourceError> {
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

    #[tokio::test]
    async fn test_default_currency_is_eur() {
        let mut source = Builtin::new(SourceConfig::new());
        let (index, catalog) = source.available_currencies().await.unwrap();

        assert_eq!(catalog.get_index(index).unwrap().0, "EUR");
        assert_eq!(catalog.get("USD").unwrap(), "United States Dollar");
        assert_eq!(catalog.len(), BUILTIN_RATES.len());
    }

    #[tokio::test]
    async fn test_convert_eur_to_usd() {
        let mut source = Builtin::new(SourceConfig::new());
        source.available_currencies().await.unwrap();
        source.add_target_currency("USD");

        let conversion = source.convert(10.0).await;
        let rate = Builtin::rate_of("USD").unwrap() / Builtin::rate_of("EUR").unwrap();

        assert_eq!(conversion.label, BUILTIN_DATE);
        assert_eq!(conversion.results.len(), 1);
        assert_eq!(conversion.results[0].code, "USD");
        assert_eq!(conversion.results[0].rate, rate);
        assert_eq!(conversion.results[0].amount, 10.0 * rate);
    }

    #[tokio::test]
    async fn test_convert_zero_amount() {
        let mut source = Builtin::new(SourceConfig::new());
        source.source_currency("GBP");
        source.add_target_currency("JPY");
        source.add_target_currency("CHF");

        let conversion = source.convert(0.0).await;
        assert_eq!(conversion.results.len(), 2);
        for result in &conversion.results {
            assert_eq!(result.amount, 0.0);
            assert!(result.rate > 0.0);
        }
        assert_eq!(conversion.results[0].code, "JPY");
        assert_eq!(conversion.results[1].code, "CHF");
    }

    #[tokio::test]
    async fn test_targets_follow_add_and_remove() {
        let mut source = Builtin::new(SourceConfig::new());
        source.source_currency("EUR");
        source.add_target_currency("USD");
        source.add_target_currency("GBP");
        source.add_target_currency("JPY");
        source.remove_target_currency("GBP");
        source.remove_target_currency("CAD");

        let codes: Vec<_> = source
            .convert(1.0)
            .await
            .results
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, ["USD", "JPY"]);
    }

    #[tokio::test]
    async fn test_unknown_base_is_reported_in_label() {
        let mut source = Builtin::new(SourceConfig::new());
        source.source_currency("XYZ");
        source.add_target_currency("USD");

        let conversion = source.convert(1.0).await;
        assert_eq!(conversion.label, "UnknownCurrency");
        assert!(conversion.results.is_empty());
    }
}
