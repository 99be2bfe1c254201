use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lingua::domain::response::{DeleteResponse, PutResponse};
use lingua::{CacheEntry, CacheKey, CacheStore, Clock, EntryMeta, ExpirationPolicy};
use shared::{Error, Result};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const STAMP_LEN: usize = 8;

/// Sled-backed cache store.
/// Each value is the creation time in big-endian unix millis followed by the payload.
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
    policy: ExpirationPolicy,
    clock: Arc<dyn Clock>,
}

struct Record<'a> {
    created_at: DateTime<Utc>,
    payload: &'a [u8],
}

fn encode(created_at: DateTime<Utc>, payload: &str) -> Vec<u8> {
    let mut value = Vec::with_capacity(STAMP_LEN + payload.len());
    value.extend_from_slice(&created_at.timestamp_millis().to_be_bytes());
    value.extend_from_slice(payload.as_bytes());
    value
}

fn decode(value: &[u8]) -> Option<Record<'_>> {
    let (stamp, payload) = value.split_at_checked(STAMP_LEN)?;
    let millis = i64::from_be_bytes(stamp.try_into().ok()?);
    Some(Record {
        created_at: DateTime::from_timestamp_millis(millis)?,
        payload,
    })
}

fn storage_error(action: &str, e: sled::Error) -> Error {
    Error::Storage(format!("Failed to {}: {}", action, e))
}

impl SledStore {
    /// Open the database, creating the parent directory if it doesn't exist
    pub fn open(
        path: impl AsRef<Path>,
        policy: ExpirationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path.as_ref()).map_err(|e| storage_error("open Sled database", e))?;
        tracing::info!("Sled cache ready at {}", path.as_ref().display());

        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
            policy,
            clock,
        })
    }

    /// Removes `key` only if it still holds `seen`, so a concurrent rewrite survives.
    fn remove_if_unchanged(&self, key: &[u8], seen: &[u8]) -> Result<bool> {
        let outcome = self
            .db
            .compare_and_swap(key, Some(seen), None as Option<&[u8]>)
            .map_err(|e| storage_error("remove expired entry", e))?;
        Ok(outcome.is_ok())
    }
}

#[async_trait]
impl CacheStore for SledStore {
    async fn read(&self, key: &CacheKey) -> Result<CacheEntry> {
        let value = self
            .db
            .get(key.as_str())
            .map_err(|e| storage_error("read entry", e))?
            .ok_or(Error::NotFound)?;

        let Some(record) = decode(&value) else {
            tracing::warn!("Corrupt cache record for key {}", key);
            return Err(Error::NotFound);
        };

        if self.policy.is_expired(record.created_at, self.clock.now()) {
            if let Err(e) = self.remove_if_unchanged(key.as_str().as_bytes(), &value) {
                tracing::warn!("Failed to evict stale entry {}: {}", key, e);
            }
            return Err(Error::NotFound);
        }

        let payload = String::from_utf8(record.payload.to_vec()).map_err(|_| Error::NotFound)?;
        Ok(CacheEntry {
            key: key.clone(),
            payload,
            created_at: record.created_at,
        })
    }

    async fn write(&self, key: &CacheKey, payload: &str) -> Result<PutResponse> {
        let value = encode(self.clock.now(), payload);
        self.db
            .insert(key.as_str(), value)
            .map_err(|e| storage_error("write entry", e))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| storage_error("flush database", e))?;
        Ok(PutResponse::new(payload.len()))
    }

    async fn delete(&self, key: &CacheKey) -> Result<DeleteResponse> {
        let removed = self
            .db
            .remove(key.as_str())
            .map_err(|e| storage_error("delete entry", e))?
            .is_some();
        Ok(DeleteResponse::new(removed))
    }

    async fn clear_all(&self) -> Result<usize> {
        let mut cleared = 0;
        for item in self.db.iter().keys() {
            let key = item.map_err(|e| storage_error("iterate database", e))?;
            if self
                .db
                .remove(&key)
                .map_err(|e| storage_error("delete entry", e))?
                .is_some()
            {
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn clean_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut cleaned = 0;
        for item in self.db.iter() {
            let (key, value) = item.map_err(|e| storage_error("iterate database", e))?;
            let expired = decode(&value)
                .map(|record| self.policy.is_expired(record.created_at, now))
                .unwrap_or(false);
            if expired && self.remove_if_unchanged(&key, &value)? {
                cleaned += 1;
            }
        }
        Ok(cleaned)
    }

    async fn entries(&self) -> Result<Vec<EntryMeta>> {
        let mut entries = Vec::new();
        for item in self.db.iter() {
            let (key, value) = item.map_err(|e| storage_error("iterate database", e))?;
            let Some(key) = std::str::from_utf8(&key)
                .ok()
                .and_then(|raw| CacheKey::parse(raw).ok())
            else {
                continue;
            };
            let Some(record) = decode(&value) else {
                continue;
            };
            entries.push(EntryMeta {
                key,
                size_bytes: record.payload.len() as u64,
                created_at: record.created_at,
            });
        }
        Ok(entries)
    }

    fn expiration(&self) -> ExpirationPolicy {
        self.policy
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn backend_type(&self) -> &str {
        "sled"
    }
}

impl Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("path", &self.path)
            .field("entries", &self.db.len())
            .finish()
    }
}
