use dashmap::DashMap;

use crate::domain::CacheKey;

/// Results already produced during one logical operation (one page render,
/// one HTTP request). Keyed exactly like the persistent cache.
#[derive(Debug, Default)]
pub struct RequestMemo {
    entries: DashMap<CacheKey, String>,
}

impl RequestMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: CacheKey, translated: String) {
        self.entries.insert(key, translated);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
