//! Persistent cache of API responses revalidated with conditional requests.

use anyhow::{Context, Result};
use reqwest::header::{
    DATE, ETAG, HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub body: Value,
}

impl CacheEntry {
    /// Captures the validators of a fresh `200 OK` response.
    pub fn from_response(headers: &HeaderMap, body: Value) -> Self {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            etag: header(ETAG),
            last_modified: header(LAST_MODIFIED).or_else(|| header(DATE)),
            body,
        }
    }

    /// Headers asking the server to answer `304 Not Modified` if unchanged.
    pub fn conditional_headers(&self) -> Vec<(HeaderName, String)> {
        let mut headers = Vec::new();
        if let Some(etag) = &self.etag {
            headers.push((IF_NONE_MATCH, etag.clone()));
        }
        if let Some(last_modified) = &self.last_modified {
            headers.push((IF_MODIFIED_SINCE, last_modified.clone()));
        }
        headers
    }
}

/// Serializes query parameters in the given order, form-urlencoding each value.
pub fn encode_query(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Key under which the response to `endpoint?query` is cached.
pub fn cache_key(endpoint: &str, query: &str) -> String {
    format!("{endpoint} {query}")
}

/// In-memory view of the on-disk response cache. Entries are never evicted.
#[derive(Debug)]
pub struct ResponseCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    /// Reads the cache file at `path`. A missing or unreadable file gives an
    /// empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable response cache");
                HashMap::new()
            }
        };
        debug!(entries = entries.len(), "Opened response cache at {}", path.display());
        Self { path, entries }
    }

    fn read(path: &Path) -> Result<HashMap<String, CacheEntry>> {
        if !path.is_file() {
            return Ok(HashMap::new());
        }
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        let entry = self.entries.get(key);
        if entry.is_some() {
            debug!("Cache HIT for key: {}", key);
        } else {
            debug!("Cache MISS for key: {}", key);
        }
        entry
    }

    pub fn put(&mut self, key: String, entry: CacheEntry) {
        debug!("Cache PUT for key: {}", key);
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes all entries back to disk, replacing the previous file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let bytes = serde_json::to_vec(&self.entries)?;
        fs::write(&self.path, bytes)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))?;
        debug!(entries = self.entries.len(), "Saved response cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_encode_query_keeps_parameter_order() {
        assert_eq!(
            encode_query(&[("base", "EUR"), ("symbols", "USD,GBP")]),
            "base=EUR&symbols=USD%2CGBP"
        );
        assert_eq!(
            encode_query(&[("symbols", "USD,GBP"), ("base", "EUR")]),
            "symbols=USD%2CGBP&base=EUR"
        );
        assert_eq!(encode_query(&[]), "");
        assert_eq!(cache_key("symbols", ""), "symbols ");
    }

    #[test]
    fn test_entry_from_response_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("\"abc\""));
        headers.insert(DATE, HeaderValue::from_static("Mon, 01 Jan 2024 00:00:00 GMT"));

        let entry = CacheEntry::from_response(&headers, json!({"success": true}));
        assert_eq!(entry.etag.as_deref(), Some("\"abc\""));
        assert_eq!(
            entry.last_modified.as_deref(),
            Some("Mon, 01 Jan 2024 00:00:00 GMT")
        );

        let conditional = entry.conditional_headers();
        assert_eq!(conditional.len(), 2);
        assert_eq!(conditional[0].0, IF_NONE_MATCH);
        assert_eq!(conditional[1].0, IF_MODIFIED_SINCE);

        let bare = CacheEntry::from_response(&HeaderMap::new(), json!({}));
        assert!(bare.conditional_headers().is_empty());
    }

    #[test]
    fn test_cache_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exchangeratesio").join("cache.bin");

        let mut cache = ResponseCache::open(&path);
        assert!(cache.is_empty());
        cache.put(
            cache_key("symbols", ""),
            CacheEntry {
                etag: Some("v1".into()),
                last_modified: None,
                body: json!({"success": true, "symbols": {"EUR": "Euro"}}),
            },
        );
        cache.save().unwrap();

        let reopened = ResponseCache::open(&path);
        assert_eq!(reopened.len(), 1);
        let entry = reopened.get("symbols ").unwrap();
        assert_eq!(entry.etag.as_deref(), Some("v1"));
        assert_eq!(entry.body["symbols"]["EUR"], "Euro");
    }

    #[test]
    fn test_corrupt_cache_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.bin");
        fs::write(&path, b"not json").unwrap();

        let cache = ResponseCache::open(&path);
        assert!(cache.is_empty());
    }
}
