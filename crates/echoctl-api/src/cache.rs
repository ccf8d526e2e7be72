// Per-session response cache
//
// Raw GET bodies keyed by request path (query string included). Entries
// live for the lifetime of the owning `SessionClient`: no TTL, no
// invalidation. Callers that need fresh data bypass it per request.

use dashmap::DashMap;

/// In-memory cache of raw response bodies.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<String, String>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached raw body for `path`, if any.
    pub fn get(&self, path: &str) -> Option<String> {
        self.entries.get(path).map(|entry| entry.value().clone())
    }

    /// Store the raw body for `path`, replacing any earlier entry.
    pub fn insert(&self, path: &str, body: String) {
        self.entries.insert(path.to_owned(), body);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
