use crate::domain::TranslationRequest;
use crate::planes::data::memo::RequestMemo;
use crate::planes::data::operation::TranslationOperations;
use crate::ports::{CacheStore, Translator};
use async_trait::async_trait;
use shared::{Error, Result};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Where the text handed back by a lookup came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Same language pair or blank content; nothing to translate.
    Untouched,
    Memo,
    Cache,
    Provider,
    /// The provider failed, so the original content is served.
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub content: String,
    pub origin: Origin,
}

impl Resolved {
    fn new(content: String, origin: Origin) -> Self {
        Self { content, origin }
    }

    /// True when the content is a translation, even one identical to the source.
    pub fn is_translated(&self) -> bool {
        matches!(self.origin, Origin::Memo | Origin::Cache | Origin::Provider)
    }
}

/// Application service that orchestrates the read-through translation flow:
/// request memo, then persistent cache, then the external provider.
///
/// Every failure on the cache or provider side degrades to returning the
/// original content; nothing is written unless the provider produced text.
#[derive(Clone)]
pub struct TranslationService {
    store: Arc<dyn CacheStore>,
    translator: Arc<dyn Translator>,
    timeout: Duration,
}

impl TranslationService {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(store: Arc<dyn CacheStore>, translator: Arc<dyn Translator>) -> Self {
        Self {
            store,
            translator,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Starts a logical operation with its own memo. Drop it when the
    /// operation (page render, HTTP request) ends.
    pub fn session(&self) -> TranslationSession {
        TranslationSession {
            service: self.clone(),
            memo: RequestMemo::new(),
        }
    }

    async fn resolve(&self, request: &TranslationRequest, memo: &RequestMemo) -> Result<Resolved> {
        if request.from == request.to || request.content.trim().is_empty() {
            return Ok(Resolved::new(request.content.clone(), Origin::Untouched));
        }

        let key = request.cache_key();
        if let Some(memoized) = memo.get(&key) {
            tracing::trace!("Memo hit for key {}", key);
            return Ok(Resolved::new(memoized, Origin::Memo));
        }

        match self.store.read(&key).await {
            Ok(entry) => {
                tracing::debug!("Cache hit for key {} ({} -> {})", key, request.from, request.to);
                memo.insert(key, entry.payload.clone());
                return Ok(Resolved::new(entry.payload, Origin::Cache));
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("Cache miss for key {} ({} -> {})", key, request.from, request.to);
            }
            Err(e) => {
                tracing::warn!("Cache read failed for key {}, treating as miss: {}", key, e);
            }
        }

        let translated = match self.call_provider(request).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(
                    "Translation to '{}' failed, serving original content: {}",
                    request.to,
                    e
                );
                return Ok(Resolved::new(request.content.clone(), Origin::Degraded));
            }
        };

        match self.store.write(&key, &translated).await {
            Ok(response) => {
                tracing::debug!("Cached {} bytes under key {}", response.bytes_written, key);
            }
            Err(e) => {
                tracing::warn!("Failed to cache translation under key {}: {}", key, e);
            }
        }

        memo.insert(key, translated.clone());
        Ok(Resolved::new(translated, Origin::Provider))
    }

    async fn call_provider(&self, request: &TranslationRequest) -> Result<String> {
        let call = self
            .translator
            .translate(&request.content, request.to.as_str());
        let translated = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                Error::Translation(format!("provider timed out after {:?}", self.timeout))
            })??;

        if translated.is_empty() {
            return Err(Error::Translation("provider returned empty text".into()));
        }
        Ok(translated)
    }
}

impl Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("backend", &self.store.backend_type())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Each call outside a session gets a fresh, short-lived memo.
#[async_trait]
impl TranslationOperations for TranslationService {
    async fn get_or_translate(&self, request: &TranslationRequest) -> Result<String> {
        let resolved = self.resolve(request, &RequestMemo::new()).await?;
        Ok(resolved.content)
    }
}

/// One logical operation. Repeated requests within it never reach the
/// provider twice, even when the persistent cache is unwritable.
#[derive(Debug)]
pub struct TranslationSession {
    service: TranslationService,
    memo: RequestMemo,
}

impl TranslationSession {
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    /// Like `get_or_translate`, but also reports where the text came from.
    pub async fn resolve(&self, request: &TranslationRequest) -> Result<Resolved> {
        self.service.resolve(request, &self.memo).await
    }
}

#[async_trait]
impl TranslationOperations for TranslationSession {
    async fn get_or_translate(&self, request: &TranslationRequest) -> Result<String> {
        Ok(self.resolve(request).await?.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::testing::{CountingTranslator, FakeStore};
    use chrono::TimeDelta;
    use std::sync::atomic::Ordering;

    fn service() -> (TranslationService, Arc<FakeStore>, Arc<CountingTranslator>) {
        let store = Arc::new(FakeStore::new());
        let translator = Arc::new(CountingTranslator::new());
        let service = TranslationService::new(store.clone(), translator.clone());
        (service, store, translator)
    }

    #[tokio::test]
    async fn test_read_through_calls_provider_once() {
        let (service, store, translator) = service();
        let request = TranslationRequest::new("Hello", "en", "ru").unwrap();

        let first = service.session().get_or_translate(&request).await.unwrap();
        let second = service.session().get_or_translate(&request).await.unwrap();

        assert_eq!(first, "[ru] Hello");
        assert_eq!(second, first);
        assert_eq!(translator.calls(), 1);
        assert_eq!(store.payload(&request.cache_key()).as_deref(), Some("[ru] Hello"));
    }

    #[tokio::test]
    async fn test_same_language_is_noop() {
        let (service, store, translator) = service();
        let request = TranslationRequest::new("Hello", "en", "en").unwrap();

        assert_eq!(service.get_or_translate(&request).await.unwrap(), "Hello");
        assert_eq!(translator.calls(), 0);
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_content_is_returned_unchanged() {
        let (service, store, translator) = service();
        for content in ["", "   \n\t"] {
            let request = TranslationRequest::new(content, "en", "ru").unwrap();
            assert_eq!(service.get_or_translate(&request).await.unwrap(), content);
        }
        assert_eq!(translator.calls(), 0);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_serves_original() {
        let (service, store, translator) = service();
        translator.fail.store(true, Ordering::SeqCst);
        let request = TranslationRequest::new("Hello", "en", "ru").unwrap();

        assert_eq!(service.get_or_translate(&request).await.unwrap(), "Hello");
        assert_eq!(store.entry_count(), 0);

        // Not cached, so the next call tries again.
        translator.fail.store(false, Ordering::SeqCst);
        assert_eq!(service.get_or_translate(&request).await.unwrap(), "[ru] Hello");
        assert_eq!(translator.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_provider_output_is_not_cached() {
        let (service, store, translator) = service();
        translator.return_empty.store(true, Ordering::SeqCst);
        let request = TranslationRequest::new("Hello", "en", "th").unwrap();

        assert_eq!(service.get_or_translate(&request).await.unwrap(), "Hello");
        assert_eq!(translator.calls(), 1);
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let store = Arc::new(FakeStore::new());
        let translator = Arc::new(CountingTranslator::slow(Duration::from_secs(30)));
        let service = TranslationService::new(store.clone(), translator.clone())
            .with_timeout(Duration::from_secs(1));
        let request = TranslationRequest::new("Hello", "en", "ru").unwrap();

        assert_eq!(service.get_or_translate(&request).await.unwrap(), "Hello");
        assert_eq!(translator.calls(), 1);
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_memo_covers_failed_writes() {
        let (service, store, translator) = service();
        store.fail_writes.store(true, Ordering::SeqCst);
        let request = TranslationRequest::new("Hello", "en", "ru").unwrap();

        let session = service.session();
        assert_eq!(session.get_or_translate(&request).await.unwrap(), "[ru] Hello");
        assert_eq!(session.get_or_translate(&request).await.unwrap(), "[ru] Hello");
        assert_eq!(translator.calls(), 1);
        assert_eq!(session.memoized(), 1);
        assert_eq!(store.entry_count(), 0);

        // A new operation starts with an empty memo.
        service.session().get_or_translate(&request).await.unwrap();
        assert_eq!(translator.calls(), 2);
    }

    #[tokio::test]
    async fn test_read_failure_degrades_to_miss() {
        let (service, store, translator) = service();
        store.fail_reads.store(true, Ordering::SeqCst);
        let request = TranslationRequest::new("Hello", "en", "ru").unwrap();

        assert_eq!(service.get_or_translate(&request).await.unwrap(), "[ru] Hello");
        assert_eq!(translator.calls(), 1);
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_translated_again() {
        let (service, store, translator) = service();
        let request = TranslationRequest::new("Hello", "en", "ru").unwrap();

        service.get_or_translate(&request).await.unwrap();
        store.clock.advance(TimeDelta::days(8));
        service.get_or_translate(&request).await.unwrap();

        assert_eq!(translator.calls(), 2);
        let entries = store.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].created_at, store.clock.now());
    }

    #[tokio::test]
    async fn test_origin_tracks_each_step() {
        let (service, _store, translator) = service();
        let request = TranslationRequest::new("Hello", "en", "ru").unwrap();

        let session = service.session();
        assert_eq!(session.resolve(&request).await.unwrap().origin, Origin::Provider);
        assert_eq!(session.resolve(&request).await.unwrap().origin, Origin::Memo);
        let cached = service.session().resolve(&request).await.unwrap();
        assert_eq!(cached.origin, Origin::Cache);
        assert!(cached.is_translated());

        let same = TranslationRequest::new("Hello", "EN", "en").unwrap();
        assert_eq!(session.resolve(&same).await.unwrap().origin, Origin::Untouched);

        translator.fail.store(true, Ordering::SeqCst);
        let other = TranslationRequest::new("Goodbye", "en", "ru").unwrap();
        let degraded = session.resolve(&other).await.unwrap();
        assert_eq!(degraded.origin, Origin::Degraded);
        assert_eq!(degraded.content, "Goodbye");
        assert!(!degraded.is_translated());
    }

    #[tokio::test]
    async fn test_post_cached_by_id_not_text() {
        let (service, _store, translator) = service();
        let original = TranslationRequest::for_post(7, "<p>First draft</p>", "en", "ru").unwrap();
        let edited = TranslationRequest::for_post(7, "<p>Edited</p>", "en", "ru").unwrap();

        let first = service.get_or_translate(&original).await.unwrap();
        let second = service.get_or_translate(&edited).await.unwrap();

        assert_eq!(first, "[ru] <p>First draft</p>");
        assert_eq!(second, first);
        assert_eq!(translator.calls(), 1);
    }
}
