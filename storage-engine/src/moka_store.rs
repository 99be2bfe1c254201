use async_trait::async_trait;
use lingua::domain::response::{DeleteResponse, PutResponse};
use lingua::{CacheEntry, CacheKey, CacheStore, Clock, EntryMeta, ExpirationPolicy};
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use shared::{Error, Result};
use std::fmt::Debug;
use std::sync::Arc;

/// Moka-based in-process cache store
/// Entries age by the injected clock so expiry matches the other backends;
/// `max_entries` bounds the cache with moka's own eviction.
#[derive(Clone)]
pub struct MokaStore {
    name: String,
    cache: Cache<CacheKey, CacheEntry>,
    policy: ExpirationPolicy,
    clock: Arc<dyn Clock>,
}

impl MokaStore {
    pub fn new(
        name: impl Into<String>,
        max_entries: Option<u64>,
        policy: ExpirationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let name = name.into();
        let mut builder = Cache::builder().name(&name);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            name,
            cache: builder.build(),
            policy,
            clock,
        }
    }

    /// Removes `key` if it is still expired at the time of removal.
    async fn evict_if_expired(&self, key: &CacheKey) -> bool {
        let now = self.clock.now();
        let policy = self.policy;
        let result = self
            .cache
            .entry_by_ref(key)
            .and_compute_with(|current| async move {
                match current {
                    Some(entry) if policy.is_expired(entry.value().created_at, now) => Op::Remove,
                    _ => Op::Nop,
                }
            })
            .await;
        matches!(result, CompResult::Removed(_))
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn read(&self, key: &CacheKey) -> Result<CacheEntry> {
        let entry = self.cache.get(key).await.ok_or(Error::NotFound)?;
        if self.policy.is_expired(entry.created_at, self.clock.now()) {
            self.evict_if_expired(key).await;
            return Err(Error::NotFound);
        }
        Ok(entry)
    }

    async fn write(&self, key: &CacheKey, payload: &str) -> Result<PutResponse> {
        let entry = CacheEntry {
            key: key.clone(),
            payload: payload.to_string(),
            created_at: self.clock.now(),
        };
        self.cache.insert(key.clone(), entry).await;
        Ok(PutResponse::new(payload.len()))
    }

    async fn delete(&self, key: &CacheKey) -> Result<DeleteResponse> {
        let existed = self.cache.remove(key).await.is_some();
        Ok(DeleteResponse::new(existed))
    }

    async fn clear_all(&self) -> Result<usize> {
        let keys: Vec<Arc<CacheKey>> = self.cache.iter().map(|(key, _)| key).collect();
        let mut cleared = 0;
        for key in keys {
            if self.cache.remove(key.as_ref()).await.is_some() {
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn clean_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let expired: Vec<Arc<CacheKey>> = self
            .cache
            .iter()
            .filter(|(_, entry)| self.policy.is_expired(entry.created_at, now))
            .map(|(key, _)| key)
            .collect();

        let mut cleaned = 0;
        for key in expired {
            if self.evict_if_expired(&key).await {
                cleaned += 1;
            }
        }
        Ok(cleaned)
    }

    async fn entries(&self) -> Result<Vec<EntryMeta>> {
        Ok(self
            .cache
            .iter()
            .map(|(_, entry)| EntryMeta {
                key: entry.key.clone(),
                size_bytes: entry.payload.len() as u64,
                created_at: entry.created_at,
            })
            .collect())
    }

    fn expiration(&self) -> ExpirationPolicy {
        self.policy
    }

    fn location(&self) -> String {
        format!("memory://{}", self.name)
    }

    fn backend_type(&self) -> &str {
        "memory"
    }
}

impl Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("name", &self.name)
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
