use crate::clock::Clock;
use crate::domain::response::DeleteResponse;
use crate::domain::response::admin::{ClearCacheResponse, CleanupResponse};
use crate::domain::{CacheKey, CacheStatistics};
use crate::planes::control::operation::AdminOperations;
use crate::planes::control::stats::StatsCollector;
use crate::ports::CacheStore;
use async_trait::async_trait;
use shared::Result;
use std::fmt::Debug;
use std::sync::Arc;

/// CacheAdmin exposes the maintenance surface of a single cache store
#[derive(Clone)]
pub struct CacheAdmin {
    store: Arc<dyn CacheStore>,
    stats: StatsCollector,
}

impl CacheAdmin {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            stats: StatsCollector::new(clock),
        }
    }
}

impl Debug for CacheAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAdmin")
            .field("backend", &self.store.backend_type())
            .field("location", &self.store.location())
            .finish()
    }
}

#[async_trait]
impl AdminOperations for CacheAdmin {
    async fn clear_cache(&self) -> Result<ClearCacheResponse> {
        let cleared = self.store.clear_all().await?;
        tracing::info!(
            "Cleared {} cache entries from {}",
            cleared,
            self.store.location()
        );
        Ok(ClearCacheResponse::new(cleared))
    }

    async fn get_stats(&self) -> Result<CacheStatistics> {
        self.stats.snapshot(self.store.as_ref()).await
    }

    async fn clean_expired(&self) -> Result<CleanupResponse> {
        let cleaned = self.store.clean_expired().await?;
        tracing::info!("Removed {} expired cache entries", cleaned);
        Ok(CleanupResponse::new(cleaned))
    }

    async fn invalidate(&self, key: &CacheKey) -> Result<DeleteResponse> {
        let response = self.store.delete(key).await?;
        tracing::debug!("Invalidated key {} (deleted: {})", key, response.deleted);
        Ok(response)
    }
}
