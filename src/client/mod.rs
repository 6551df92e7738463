//! Analytics backend client

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ApiError, Result};

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod retry;
pub mod transport;

#[cfg(test)]
pub use mock::{MockBehavior, MockTransport};
pub use retry::{ResilientFetcher, RetryPolicy};
pub use transport::HttpTransport;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One-shot HTTP GET against the backend.
///
/// Implementations perform a single exchange with no retry and no timeout of
/// their own; [`ResilientFetcher`] layers both on top.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET and return whatever the server answered
    async fn get(&self, url: &str) -> Result<HttpResponse>;

    /// GET and parse a JSON body. Non-2xx statuses and unparseable bodies
    /// are errors.
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.get(url).await?;

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                url: url.to_string(),
            }
            .into());
        }

        serde_json::from_str(&response.body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e))
                .into()
        })
    }
}
