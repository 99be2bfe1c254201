use async_trait::async_trait;

use shared::Result;

use crate::domain::{
    CacheKey, CacheStatistics,
    response::{
        DeleteResponse,
        admin::{ClearCacheResponse, CleanupResponse},
    },
};

#[async_trait]
pub trait AdminOperations: Send + Sync + 'static {
    async fn clear_cache(&self) -> Result<ClearCacheResponse>;
    async fn get_stats(&self) -> Result<CacheStatistics>;
    async fn clean_expired(&self) -> Result<CleanupResponse>;
    async fn invalidate(&self, key: &CacheKey) -> Result<DeleteResponse>;
}
