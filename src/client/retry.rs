//! Timeout-bounded, retrying fetches
//!
//! Each attempt races the transport against a deadline. A lost race drops
//! the in-flight request. Attempts are separated by a fixed delay and capped
//! by the policy; after the last failure the final error is returned.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use super::Transport;
use crate::config::FetchSettings;
use crate::error::{ApiError, Error, Result};

/// Attempt budget, per-attempt deadline and inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; never below 1
    pub max_attempts: u32,
    pub timeout: Duration,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetchSettings::default())
    }
}

impl From<&FetchSettings> for RetryPolicy {
    fn from(settings: &FetchSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            timeout: settings.timeout(),
            delay: settings.retry_delay(),
        }
    }
}

impl RetryPolicy {
    /// One attempt, no delay. Used for connectivity probes.
    pub fn single(timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            timeout,
            delay: Duration::ZERO,
        }
    }
}

/// Wraps a [`Transport`] with the retry policy
pub struct ResilientFetcher<T: Transport> {
    transport: Arc<T>,
    policy: RetryPolicy,
}

impl<T: Transport> Clone for ResilientFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            policy: self.policy,
        }
    }
}

impl<T: Transport> ResilientFetcher<T> {
    pub fn with_shared(transport: Arc<T>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Fetch `url` as JSON using the configured policy
    pub async fn fetch(&self, url: &str) -> Result<Value> {
        self.fetch_with(url, &self.policy).await
    }

    /// Fetch `url` as JSON under an explicit policy
    pub async fn fetch_with(&self, url: &str, policy: &RetryPolicy) -> Result<Value> {
        let attempts = policy.max_attempts.max(1);
        let mut last_error: Option<Error> = None;

        for attempt in 1..=attempts {
            match tokio::time::timeout(policy.timeout, self.transport.get_json(url)).await {
                Ok(Ok(value)) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}/{}", url, attempt, attempts);
                    }
                    return Ok(value);
                }
                Ok(Err(e)) => {
                    warn!("Attempt {}/{} for {} failed: {}", attempt, attempts, url, e);
                    last_error = Some(e);
                }
                Err(_) => {
                    let e: Error = ApiError::Timeout {
                        url: url.to_string(),
                        timeout: policy.timeout,
                    }
                    .into();
                    warn!("Attempt {}/{} for {} failed: {}", attempt, attempts, url, e);
                    last_error = Some(e);
                }
            }

            if attempt < attempts && !policy.delay.is_zero() {
                debug!("Retrying {} in {:?}", url, policy.delay);
                tokio::time::sleep(policy.delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| Error::Other(format!("No attempt was made for {}", url))))
    }

    /// Single-attempt reachability check
    pub async fn probe(&self, url: &str) -> bool {
        let policy = RetryPolicy::single(self.policy.timeout);
        match self.fetch_with(url, &policy).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Probe of {} failed: {}", url, e);
                false
            }
        }
    }
}
