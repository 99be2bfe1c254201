use async_trait::async_trait;
use lingua::domain::response::{DeleteResponse, PutResponse};
use lingua::{CacheEntry, CacheKey, CacheStore, EntryMeta, ExpirationPolicy};
use shared::{Error, Result};

/// Stands in when the configured backend cannot be opened: every read is a
/// miss and nothing is kept, so translations go straight to the provider.
#[derive(Debug, Clone, Default)]
pub struct PassthroughStore {
    policy: ExpirationPolicy,
    reason: String,
}

impl PassthroughStore {
    pub fn new(policy: ExpirationPolicy, reason: impl Into<String>) -> Self {
        Self {
            policy,
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[async_trait]
impl CacheStore for PassthroughStore {
    async fn read(&self, _key: &CacheKey) -> Result<CacheEntry> {
        Err(Error::NotFound)
    }

    async fn write(&self, _key: &CacheKey, _payload: &str) -> Result<PutResponse> {
        Ok(PutResponse::new(0))
    }

    async fn delete(&self, _key: &CacheKey) -> Result<DeleteResponse> {
        Ok(DeleteResponse::new(false))
    }

    async fn clear_all(&self) -> Result<usize> {
        Ok(0)
    }

    async fn clean_expired(&self) -> Result<usize> {
        Ok(0)
    }

    async fn entries(&self) -> Result<Vec<EntryMeta>> {
        Ok(Vec::new())
    }

    fn expiration(&self) -> ExpirationPolicy {
        self.policy
    }

    fn location(&self) -> String {
        "none".to_string()
    }

    fn backend_type(&self) -> &str {
        "passthrough"
    }
}
