//! Per-endpoint access with a fixed fallback chain
//!
//! fresh cache, then network, then stale cache, then backup data. Errors are
//! absorbed here: callers always receive a value.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::{DashboardField, LogicalField};
use crate::cache::{CacheStore, cache_key};
use crate::client::{ResilientFetcher, Transport};

/// Where a returned value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Fresh cache entry
    Cache,
    /// Successful backend fetch
    Network,
    /// Expired cache entry served after a failed fetch
    Stale,
    /// Static backup data
    Backup,
}

impl Source {
    /// Cache and network data count as live
    pub fn is_live(&self) -> bool {
        matches!(self, Source::Cache | Source::Network)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Source::Cache => "cache",
            Source::Network => "network",
            Source::Stale => "stale",
            Source::Backup => "backup",
        };
        f.write_str(label)
    }
}

/// A value tagged with its source
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }
}

/// Reads one endpoint through the cache, the fetcher and the fallbacks
pub struct EndpointAccessor<T: Transport> {
    base_url: String,
    store: Arc<CacheStore>,
    fetcher: ResilientFetcher<T>,
}

impl<T: Transport> EndpointAccessor<T> {
    pub fn new(base_url: &str, store: Arc<CacheStore>, fetcher: ResilientFetcher<T>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            fetcher,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve `field`, skipping the fresh-cache lookup when `force_refresh`
    pub async fn get_endpoint<F: LogicalField>(
        &self,
        field: F,
        force_refresh: bool,
    ) -> Sourced<Value> {
        let path = field.path();
        let key = cache_key(path);

        if !force_refresh {
            if let Some(cached) = self.store.get(&key) {
                debug!("Cache hit: {}", key);
                return Sourced::new(cached, Source::Cache);
            }
            debug!("Cache miss: {}", key);
        }

        let url = self.url_for(path);
        match self.fetcher.fetch(&url).await {
            Ok(payload) => {
                self.store.set(&key, payload.clone());
                Sourced::new(payload, Source::Network)
            }
            Err(e) => {
                if let Some(stale) = self.store.get_stale(&key) {
                    warn!("{} unavailable ({}), serving stale data (degraded)", field, e);
                    Sourced::new(stale, Source::Stale)
                } else {
                    warn!("{} unavailable ({}), serving backup data", field, e);
                    Sourced::new(field.backup(), Source::Backup)
                }
            }
        }
    }

    /// Drop the cached payload for an endpoint path
    pub fn invalidate(&self, path: &str) -> bool {
        self.store.invalidate(&cache_key(path))
    }

    /// Drop every cached payload
    pub fn clear(&self) -> usize {
        self.store.clear()
    }

    /// One uncached attempt against `base_url`. True if the backend answered
    /// with a JSON success.
    pub async fn probe(&self, base_url: &str) -> bool {
        let url = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            DashboardField::TotalVolume.path()
        );
        self.fetcher.probe(&url).await
    }
}
