use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lingua::domain::response::{DeleteResponse, PutResponse};
use lingua::{CacheEntry, CacheKey, CacheStore, Clock, EntryMeta, ExpirationPolicy};
use shared::{Error, Result};
use std::fmt::Debug;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tempfile::NamedTempFile;
use tokio::fs;

const ENTRY_EXTENSION: &str = "cache";
const ACCESS_GUARD: &str = ".htaccess";
const ACCESS_GUARD_RULES: &str = "Order deny,allow\nDeny from all\n";
const INDEX_GUARD: &str = "index.html";

/// Creates the cache directory and the files that stop a web server from
/// listing or serving it. Safe to call any number of times.
///
/// Permissions are only tightened on a directory created here; an existing
/// directory keeps whatever mode its operator gave it.
fn provision(root: &Path) -> Result<()> {
    let created = !root.is_dir();
    std::fs::create_dir_all(root).map_err(|e| {
        Error::Storage(format!(
            "Failed to create cache directory {}: {}",
            root.display(),
            e
        ))
    })?;

    let guard = root.join(ACCESS_GUARD);
    if !guard.exists() {
        std::fs::write(&guard, ACCESS_GUARD_RULES)?;
    }
    let index = root.join(INDEX_GUARD);
    if !index.exists() {
        std::fs::write(&index, "")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if created {
            let restricted = std::fs::Permissions::from_mode(0o750);
            if let Err(e) = std::fs::set_permissions(root, restricted) {
                tracing::warn!("Could not restrict access to {}: {}", root.display(), e);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = created;

    Ok(())
}

/// Tally of a bulk removal that carries on past individual failures.
#[derive(Default)]
struct Sweep {
    removed: usize,
    failed: usize,
    first_error: Option<Error>,
}

impl Sweep {
    fn record(&mut self, outcome: Result<bool>) {
        match outcome {
            Ok(true) => self.removed += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("{}", e);
                self.failed += 1;
                self.first_error.get_or_insert(e);
            }
        }
    }

    fn finish(self, action: &str) -> Result<usize> {
        match self.first_error {
            None => Ok(self.removed),
            Some(e) => Err(Error::Storage(format!(
                "{} removed {} entries but could not remove {}: {}",
                action, self.removed, self.failed, e
            ))),
        }
    }
}

/// One `<key>.cache` file per entry. The file's modification time is the
/// entry's creation time.
pub struct FilesystemStore {
    root: PathBuf,
    policy: ExpirationPolicy,
    clock: Arc<dyn Clock>,
}

struct StoredFile {
    path: PathBuf,
    meta: EntryMeta,
    /// False for anything squatting on an entry name, such as a directory.
    is_file: bool,
}

impl FilesystemStore {
    pub fn new(
        root: impl Into<PathBuf>,
        policy: ExpirationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let root = root.into();
        provision(&root)?;
        tracing::info!("Filesystem cache ready at {}", root.display());
        Ok(Self {
            root,
            policy,
            clock,
        })
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    fn key_from_path(path: &Path) -> Option<CacheKey> {
        if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
            return None;
        }
        CacheKey::parse(path.file_stem()?.to_str()?).ok()
    }

    /// Lists everything named like an entry. Files that vanish mid-scan are skipped.
    async fn scan(&self) -> Result<Vec<StoredFile>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            let Some(key) = Self::key_from_path(&path) else {
                continue;
            };
            let metadata = match item.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            files.push(StoredFile {
                path,
                meta: EntryMeta {
                    key,
                    size_bytes: metadata.len(),
                    created_at: DateTime::<Utc>::from(modified),
                },
                is_file: metadata.is_file(),
            });
        }
        Ok(files)
    }

    /// Removes a file, reporting whether this call removed it.
    async fn remove(path: &Path) -> Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Storage(format!(
                "Failed to remove cache file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Removes a stale file unless it was rewritten since it was inspected.
    async fn evict_if_unchanged(path: &Path, seen_created_at: DateTime<Utc>) -> Result<bool> {
        let current = match fs::metadata(path).await.and_then(|m| m.modified()) {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(_) => return Ok(false),
        };
        if current != seen_created_at {
            return Ok(false);
        }
        Self::remove(path).await
    }
}

#[async_trait]
impl CacheStore for FilesystemStore {
    async fn read(&self, key: &CacheKey) -> Result<CacheEntry> {
        let path = self.entry_path(key);
        let created_at = match fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(_) => return Err(Error::NotFound),
        };

        if self.policy.is_expired(created_at, self.clock.now()) {
            if let Err(e) = Self::evict_if_unchanged(&path, created_at).await {
                tracing::warn!("Failed to evict stale entry {}: {}", key, e);
            }
            return Err(Error::NotFound);
        }

        match fs::read_to_string(&path).await {
            Ok(payload) => Ok(CacheEntry {
                key: key.clone(),
                payload,
                created_at,
            }),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!("Unreadable cache entry {}: {}", path.display(), e);
                }
                Err(Error::NotFound)
            }
        }
    }

    async fn write(&self, key: &CacheKey, payload: &str) -> Result<PutResponse> {
        let root = self.root.clone();
        let path = self.entry_path(key);
        let payload = payload.to_owned();
        let created_at = SystemTime::from(self.clock.now());

        let bytes_written = tokio::task::spawn_blocking(move || -> Result<usize> {
            let mut file = match NamedTempFile::new_in(&root) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    provision(&root)?;
                    NamedTempFile::new_in(&root)?
                }
                Err(e) => return Err(e.into()),
            };
            file.write_all(payload.as_bytes())?;
            file.as_file().set_modified(created_at)?;
            file.as_file().sync_all()?;
            file.persist(&path).map_err(|e| {
                Error::Storage(format!(
                    "Failed to persist cache file {}: {}",
                    path.display(),
                    e.error
                ))
            })?;
            Ok(payload.len())
        })
        .await
        .map_err(|e| Error::Internal(format!("Cache write task failed: {}", e)))??;

        Ok(PutResponse::new(bytes_written))
    }

    async fn delete(&self, key: &CacheKey) -> Result<DeleteResponse> {
        let deleted = Self::remove(&self.entry_path(key)).await?;
        Ok(DeleteResponse::new(deleted))
    }

    async fn clear_all(&self) -> Result<usize> {
        let mut sweep = Sweep::default();
        for file in self.scan().await? {
            sweep.record(Self::remove(&file.path).await);
        }
        sweep.finish("Clear")
    }

    async fn clean_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut sweep = Sweep::default();
        for file in self.scan().await? {
            if self.policy.is_expired(file.meta.created_at, now) {
                sweep.record(Self::evict_if_unchanged(&file.path, file.meta.created_at).await);
            }
        }
        sweep.finish("Cleanup")
    }

    async fn entries(&self) -> Result<Vec<EntryMeta>> {
        Ok(self
            .scan()
            .await?
            .into_iter()
            .filter(|file| file.is_file)
            .map(|file| file.meta)
            .collect())
    }

    fn expiration(&self) -> ExpirationPolicy {
        self.policy
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> &str {
        "filesystem"
    }
}

impl Debug for FilesystemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemStore")
            .field("root", &self.root)
            .field("ttl", &self.policy.ttl)
            .finish()
    }
}
