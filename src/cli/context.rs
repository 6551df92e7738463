//! Command execution context
//!
//! Composition root for commands that talk to the backend: loads the
//! configuration, applies overrides, and wires one cache store, one fetcher
//! and one aggregator together.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::{HttpTransport, ResilientFetcher, RetryPolicy};
use crate::config::Config;
use crate::dashboard::{Aggregator, EndpointAccessor};
use crate::error::Result;

/// Context for command execution containing config, clients, and runtime options.
pub struct CommandContext {
    /// Loaded configuration with CLI/env overrides applied
    pub config: Config,
    /// Shared HTTP transport; also used directly by diagnostics
    pub transport: Arc<HttpTransport>,
    /// Dashboard aggregator over the shared cache
    pub aggregator: Aggregator<HttpTransport>,
    /// Output format preference
    pub format: OutputFormat,
    /// Skip fresh cache entries on the first fetch
    pub force_refresh: bool,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// # Errors
    /// Returns error if the config cannot be loaded, an override makes it
    /// invalid, or the HTTP client cannot be built.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = load_config(opts)?;

        let transport = Arc::new(HttpTransport::new()?);
        let store = Arc::new(CacheStore::new(config.cache_ttl()));
        log::debug!("Cache TTL {:?}", store.default_ttl());
        let fetcher =
            ResilientFetcher::with_shared(Arc::clone(&transport), RetryPolicy::from(&config.fetch));
        let accessor = EndpointAccessor::new(&config.base_url, store, fetcher);

        log::debug!(
            "Backend {} (attempts={}, timeout={}ms, delay={}ms)",
            config.base_url,
            config.fetch.max_attempts,
            config.fetch.timeout_ms,
            config.fetch.retry_delay_ms
        );

        Ok(Self {
            config,
            transport,
            aggregator: Aggregator::new(accessor),
            format: opts.format,
            force_refresh: opts.refresh,
        })
    }
}

/// Load the config file and apply CLI/env overrides
pub fn load_config(opts: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load_at(opts.config_ref())?;
    config.apply_overrides(opts.base_url_ref(), opts.timeout_ms, opts.retries);
    config.validate()?;
    Ok(config)
}
