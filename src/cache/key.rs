//! Cache key naming

/// Prefix shared by every backend-derived cache key
const KEY_PREFIX: &str = "api_";

/// Key under which the merged dashboard composite is stored
pub const COMPOSITE_KEY: &str = "api_dashboard_all";

/// Key under which the merged data-structure samples are stored
pub const STRUCTURES_KEY: &str = "api_structures_all";

/// Cache key for a single endpoint path (e.g. `/detections/volume/total`).
///
/// Paths are used verbatim so that invalidating by path hits the same entry
/// the accessor wrote.
pub fn cache_key(path: &str) -> String {
    format!("{}{}", KEY_PREFIX, path)
}
