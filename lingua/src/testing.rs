use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::clock::{Clock, ManualClock};
use crate::domain::response::{DeleteResponse, PutResponse};
use crate::domain::{CacheEntry, CacheKey, EntryMeta, ExpirationPolicy};
use crate::ports::{CacheStore, Translator};

/// HashMap-backed store driven by a manual clock.
#[derive(Debug)]
pub struct FakeStore {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    pub clock: Arc<ManualClock>,
    policy: ExpirationPolicy,
    pub writes: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock: Arc::new(ManualClock::starting_now()),
            policy: ExpirationPolicy::default(),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn payload(&self, key: &CacheKey) -> Option<String> {
        self.entries.lock().get(key).map(|e| e.payload.clone())
    }
}

impl Default for FakeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for FakeStore {
    async fn read(&self, key: &CacheKey) -> Result<CacheEntry> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Storage("read failure".into()));
        }
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let entry = entries.get(key).cloned().ok_or(Error::NotFound)?;
        if self.policy.is_expired(entry.created_at, now) {
            entries.remove(key);
            return Err(Error::NotFound);
        }
        Ok(entry)
    }

    async fn write(&self, key: &CacheKey, payload: &str) -> Result<PutResponse> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage("disk full".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        let entry = CacheEntry {
            key: key.clone(),
            payload: payload.to_string(),
            created_at: self.clock.now(),
        };
        self.entries.lock().insert(key.clone(), entry);
        Ok(PutResponse::new(payload.len()))
    }

    async fn delete(&self, key: &CacheKey) -> Result<DeleteResponse> {
        Ok(DeleteResponse::new(self.entries.lock().remove(key).is_some()))
    }

    async fn clear_all(&self) -> Result<usize> {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        Ok(count)
    }

    async fn clean_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| !self.policy.is_expired(e.created_at, now));
        Ok(before - entries.len())
    }

    async fn entries(&self) -> Result<Vec<EntryMeta>> {
        Ok(self
            .entries
            .lock()
            .values()
            .map(|e| EntryMeta {
                key: e.key.clone(),
                size_bytes: e.payload.len() as u64,
                created_at: e.created_at,
            })
            .collect())
    }

    fn expiration(&self) -> ExpirationPolicy {
        self.policy
    }

    fn location(&self) -> String {
        "memory://fake".to_string()
    }

    fn backend_type(&self) -> &str {
        "fake"
    }
}

/// Translator double that records calls.
#[derive(Debug, Default)]
pub struct CountingTranslator {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub return_empty: AtomicBool,
    pub delay: Option<Duration>,
}

impl CountingTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for CountingTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Translation("provider unavailable".into()));
        }
        if self.return_empty.load(Ordering::SeqCst) {
            return Ok(String::new());
        }
        Ok(format!("[{}] {}", target_language, text))
    }
}
