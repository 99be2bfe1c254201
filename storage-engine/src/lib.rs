pub mod filesystem_store;
pub mod moka_store;
pub mod passthrough_store;
pub mod sled_store;

pub use filesystem_store::FilesystemStore;
pub use moka_store::MokaStore;
pub use passthrough_store::PassthroughStore;
pub use sled_store::SledStore;

use lingua::{CacheSettings, CacheStore, Clock, StorageFactory};
use shared::Result;
use shared::config::StoreBackend;
use std::sync::Arc;

/// Builds the configured cache backend
#[derive(Debug, Clone)]
pub struct UnifiedStorageFactory {
    clock: Arc<dyn Clock>,
}

impl UnifiedStorageFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Like `create_from_config`, but an unusable backend downgrades to a
    /// store that caches nothing instead of failing.
    pub fn create_or_passthrough(&self, settings: &CacheSettings) -> Arc<dyn CacheStore> {
        match self.create_from_config(settings) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(
                    "Cache backend {} unavailable, translating without a cache: {}",
                    settings.backend.as_str(),
                    e
                );
                Arc::new(PassthroughStore::new(settings.expiration, e.to_string()))
            }
        }
    }
}

impl StorageFactory for UnifiedStorageFactory {
    fn create_from_config(&self, settings: &CacheSettings) -> Result<Arc<dyn CacheStore>> {
        let store: Arc<dyn CacheStore> = match settings.backend {
            StoreBackend::Filesystem => Arc::new(FilesystemStore::new(
                &settings.location,
                settings.expiration,
                self.clock.clone(),
            )?),
            StoreBackend::Sled => Arc::new(SledStore::open(
                &settings.location,
                settings.expiration,
                self.clock.clone(),
            )?),
            StoreBackend::Memory => Arc::new(MokaStore::new(
                "translations",
                settings.max_entries,
                settings.expiration,
                self.clock.clone(),
            )),
        };

        tracing::info!(
            "Using {} cache backend at {} (ttl {:?})",
            store.backend_type(),
            store.location(),
            settings.expiration.ttl
        );
        Ok(store)
    }
}
