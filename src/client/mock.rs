//! Scriptable transport for testing
//!
//! Routes are matched by URL suffix so tests can use any base URL.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use super::{HttpResponse, Transport};
use crate::error::{ApiError, Result};

/// What a route answers with
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// 200 with the value as body
    Json(Value),
    /// Given status with an empty body
    Status(u16),
    /// 200 with a raw body
    Body(String),
    NetworkError(String),
    /// Never completes
    Hang,
}

#[derive(Debug, Clone)]
enum Route {
    Fixed(MockBehavior),
    /// Consumed front to back; the last entry repeats
    Sequence(VecDeque<MockBehavior>),
}

/// Mock transport for testing.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new()
///     .with_json("/detections/lanes/speed", json!({"lane_1": 80.0}))
///     .with_status("/detections/bottlenecks", 503);
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(self, path: &str, behavior: MockBehavior) -> Self {
        self.set_behavior(path, behavior);
        self
    }

    pub fn with_json(self, path: &str, value: Value) -> Self {
        self.with_behavior(path, MockBehavior::Json(value))
    }

    pub fn with_status(self, path: &str, status: u16) -> Self {
        self.with_behavior(path, MockBehavior::Status(status))
    }

    pub fn with_body(self, path: &str, body: &str) -> Self {
        self.with_behavior(path, MockBehavior::Body(body.to_string()))
    }

    pub fn with_network_error(self, path: &str, message: &str) -> Self {
        self.with_behavior(path, MockBehavior::NetworkError(message.to_string()))
    }

    pub fn with_hang(self, path: &str) -> Self {
        self.with_behavior(path, MockBehavior::Hang)
    }

    pub fn with_sequence(self, path: &str, behaviors: Vec<MockBehavior>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Sequence(behaviors.into()));
        self
    }

    /// Replace a route's behavior mid-test
    pub fn set_behavior(&self, path: &str, behavior: MockBehavior) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Fixed(behavior));
    }

    /// Calls whose URL ends with `path`
    pub fn call_count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.ends_with(path))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Start instants of calls whose URL ends with `path`
    pub fn call_times(&self, path: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.ends_with(path))
            .map(|(_, at)| *at)
            .collect()
    }

    fn next_behavior(&self, url: &str) -> Option<MockBehavior> {
        let mut routes = self.routes.lock().unwrap();
        let (_, route) = routes
            .iter_mut()
            .filter(|(path, _)| url.ends_with(path.as_str()))
            .max_by_key(|(path, _)| path.len())?;

        match route {
            Route::Fixed(behavior) => Some(behavior.clone()),
            Route::Sequence(queue) if queue.len() > 1 => queue.pop_front(),
            Route::Sequence(queue) => queue.front().cloned(),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        match self.next_behavior(url) {
            Some(MockBehavior::Json(value)) => Ok(HttpResponse {
                status: 200,
                body: value.to_string(),
            }),
            Some(MockBehavior::Status(status)) => Ok(HttpResponse {
                status,
                body: String::new(),
            }),
            Some(MockBehavior::Body(body)) => Ok(HttpResponse { status: 200, body }),
            Some(MockBehavior::NetworkError(message)) => Err(ApiError::Network(message).into()),
            Some(MockBehavior::Hang) => std::future::pending().await,
            None => Err(ApiError::Network(format!("No mock route for {}", url)).into()),
        }
    }
}
