#![deny(clippy::all)]

use crate::domain::response::{DeleteResponse, PutResponse};
use crate::domain::{
    CacheEntry, CacheKey, CacheSettings, EntryMeta, ExpirationPolicy, LanguageCode,
};
use async_trait::async_trait;
use shared::Result;
use std::sync::Arc;

// Ports are the pluggable extension points for storage backends and translation providers

/// Port for creating cache storage from configuration
pub trait StorageFactory: Send + Sync + 'static {
    fn create_from_config(&self, settings: &CacheSettings) -> Result<Arc<dyn CacheStore>>;
}

/// Port for translation cache storage (filesystem, sled, moka)
///
/// `read` reports misses, expired entries and unreadable entries alike as
/// `Error::NotFound`; an expired entry is removed as part of the read. Other
/// errors from `read` mean the backend itself is failing.
/// Writes replace any existing entry and reset its creation time.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    async fn read(&self, key: &CacheKey) -> Result<CacheEntry>;
    async fn write(&self, key: &CacheKey, payload: &str) -> Result<PutResponse>;
    /// Deleting an absent key succeeds with `deleted == false`.
    async fn delete(&self, key: &CacheKey) -> Result<DeleteResponse>;
    async fn clear_all(&self) -> Result<usize>;
    async fn clean_expired(&self) -> Result<usize>;
    /// Point-in-time listing; entries may come and go while it runs.
    async fn entries(&self) -> Result<Vec<EntryMeta>>;

    fn expiration(&self) -> ExpirationPolicy;
    fn location(&self) -> String;
    fn backend_type(&self) -> &str;
}

/// Port for the external translation provider.
///
/// The provider detects the source language; callers only supply the target.
#[async_trait]
pub trait Translator: Send + Sync + 'static {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Port for the multilingual site plugin that knows which languages exist.
pub trait LanguageProvider: Send + Sync + 'static {
    fn default_language(&self) -> LanguageCode;
    fn supported_languages(&self) -> Vec<LanguageCode>;
    /// Picks a supported language from an `Accept-Language` header value.
    fn negotiate(&self, accept_language: &str) -> LanguageCode;
}
