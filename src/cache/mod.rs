//! In-memory cache for backend responses
//!
//! Holds the per-endpoint payloads and the merged dashboard composite for the
//! lifetime of the process. Nothing is persisted.

pub mod clock;
pub mod key;
pub mod store;

use std::time::Duration;

/// Cache TTL configuration
pub struct CacheTtl;

impl CacheTtl {
    /// Default lifetime for endpoint payloads and composites (5 min)
    pub const DEFAULT: Duration = Duration::from_secs(5 * 60);
}

// Re-export main types
pub use key::{COMPOSITE_KEY, STRUCTURES_KEY, cache_key};
pub use store::CacheStore;
