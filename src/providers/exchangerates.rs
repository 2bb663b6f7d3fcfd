//! Live rates from the exchangerates API, cached across runs.

use super::caching::{CacheEntry, ResponseCache, cache_key, encode_query};
use crate::core::source::Selection;
use crate::core::{
    Catalog, ConfigValue, Conversion, ConvertedAmount, Source, SourceConfig, SourceError,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const APIKEY_OPTION: &str = "apikey";

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    success: bool,
    #[serde(default)]
    symbols: Catalog,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    success: bool,
    #[serde(default)]
    date: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

pub struct ExchangeRatesIO {
    config: SourceConfig,
    base_url: String,
    client: reqwest::Client,
    cache: ResponseCache,
    selection: Selection,
}

impl ExchangeRatesIO {
    pub fn new(
        config: SourceConfig,
        base_url: &str,
        timeout: Duration,
        cache_path: PathBuf,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("currency-converter/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache: ResponseCache::open(cache_path),
            selection: Selection::default(),
        })
    }

    fn api_key(&self) -> Result<String, SourceError> {
        self.config
            .get(APIKEY_OPTION)
            .and_then(ConfigValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| SourceError::MissingOption(APIKEY_OPTION.to_string()))
    }

    /// Sends a GET to `endpoint`, revalidating any cached response for the
    /// exact same endpoint and query.
    #[instrument(name = "ExchangeRatesRequest", skip(self, params), fields(endpoint = %endpoint))]
    async fn request(&mut self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, SourceError> {
        let api_key = self.api_key()?;
        let query = encode_query(params);
        let url = if query.is_empty() {
            format!("{}/{}", self.base_url, endpoint)
        } else {
            format!("{}/{}?{}", self.base_url, endpoint, query)
        };
        let key = cache_key(endpoint, &query);

        let mut request = self.client.get(&url).header(APIKEY_OPTION, api_key);
        if let Some(entry) = self.cache.get(&key) {
            for (name, value) in entry.conditional_headers() {
                request = request.header(name, value);
            }
        }

        debug!("Requesting {}", url);
        let response = request.send().await?;
        debug!(status = %response.status(), "Received response");

        match response.status() {
            StatusCode::NOT_MODIFIED => self
                .cache
                .get(&key)
                .map(|entry| entry.body.clone())
                .ok_or_else(|| SourceError::Api("Not modified without a cached response".into())),
            StatusCode::OK => {
                let headers = response.headers().clone();
                let text = response.text().await?;
                let body: Value = serde_json::from_str(&text)?;
                self.cache
                    .put(key, CacheEntry::from_response(&headers, body.clone()));
                Ok(body)
            }
            status => Err(SourceError::Api(format!("Unexpected status: {status}"))),
        }
    }

    async fn latest(&mut self, amount: f64) -> Result<Conversion, SourceError> {
        let base = self.selection.base.clone();
        let symbols = self.selection.targets().join(",");
        let body = self
            .request("latest", &[("base", base.as_str()), ("symbols", symbols.as_str())])
            .await?;

        let data: LatestResponse = serde_json::from_value(body)?;
        if !data.success {
            return Err(SourceError::Api("Invalid API response".into()));
        }

        let results = self
            .selection
            .targets()
            .iter()
            .map(|code| {
                let rate = *data
                    .rates
                    .get(code)
                    .ok_or_else(|| SourceError::UnknownCurrency(code.clone()))?;
                Ok(ConvertedAmount {
                    code: code.clone(),
                    amount: amount * rate,
                    rate,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        Ok(Conversion {
            label: data.date,
            results,
        })
    }
}

#[async_trait]
impl Source for ExchangeRatesIO {
    async fn close(&mut self) {
        if let Err(e) = self.cache.save() {
            warn!(error = %e, "Failed to save response cache");
        }
    }

    async fn available_currencies(&mut self) -> Result<(usize, Catalog), SourceError> {
        let body = self.request("symbols", &[]).await?;
        let data: SymbolsResponse = serde_json::from_value(body)?;
        if !data.success {
            return Err(SourceError::Api("API request failed".into()));
        }
        let index = self.selection.reset_base(&data.symbols);
        Ok((index, data.symbols))
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
        match self.latest(amount).await {
            Ok(conversion) => conversion,
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                Conversion::failed(&e)
            }
        }
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
