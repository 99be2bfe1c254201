use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use shared::config::{Config, StoreBackend};
use shared::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::key::KeyDeriver;

pub mod response {

    pub mod admin {
        use serde::Serialize;

        #[derive(Clone, Debug, Serialize)]
        pub struct ClearCacheResponse {
            pub cleared_count: usize,
        }

        impl ClearCacheResponse {
            pub fn new(cleared_count: usize) -> Self {
                Self { cleared_count }
            }
        }

        #[derive(Clone, Debug, Serialize)]
        pub struct CleanupResponse {
            pub cleaned_count: usize,
        }

        impl CleanupResponse {
            pub fn new(cleaned_count: usize) -> Self {
                Self { cleaned_count }
            }
        }
    }

    #[derive(Clone, Debug)]
    pub struct PutResponse {
        pub bytes_written: usize,
    }

    impl PutResponse {
        pub fn new(bytes_written: usize) -> Self {
            Self { bytes_written }
        }
    }

    #[derive(Clone, Debug, serde::Serialize)]
    pub struct DeleteResponse {
        pub deleted: bool,
    }

    impl DeleteResponse {
        pub fn new(deleted: bool) -> Self {
            Self { deleted }
        }
    }
}

/// A validated language code such as `en` or `zh-cn`, trimmed and lowercased
/// so `EN` and `en` name the same language and the same cache entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    const FALLBACK: &str = "en";

    /// Used when no language information is available at all.
    pub fn fallback() -> Self {
        Self(Self::FALLBACK.to_string())
    }

    pub fn new(code: impl AsRef<str>) -> Result<Self> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("language code must not be empty".into()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Site/network boundary that namespaces cache entries.
///
/// A missing identifier and an empty identifier are different scopes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantScope {
    pub site: Option<String>,
    pub network: Option<String>,
}

impl TenantScope {
    pub fn new(site: Option<String>, network: Option<String>) -> Self {
        Self { site, network }
    }

    /// Scope for single-site deployments.
    pub fn global() -> Self {
        Self::default()
    }
}

/// Cache namespace of a piece of content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Post,
    Title,
    #[serde(rename = "menu")]
    MenuItem,
    #[default]
    Generic,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Title => "title",
            ContentType::MenuItem => "menu",
            ContentType::Generic => "generic",
        }
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "post" => Ok(ContentType::Post),
            "title" => Ok(ContentType::Title),
            "menu" | "menu_item" => Ok(ContentType::MenuItem),
            "generic" | "translation" | "" => Ok(ContentType::Generic),
            other => Err(Error::InvalidInput(format!("unknown content type '{}'", other))),
        }
    }
}

/// Identity of the content being translated, as seen by the key deriver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fingerprint<'a> {
    /// Content-addressed: the literal text.
    Text(&'a str),
    /// A stable surrogate such as a post id.
    Id(&'a str),
}

/// Fixed-length hex digest identifying one cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub const LEN: usize = 64;

    pub(crate) fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Validates an externally supplied key (admin surface, storage enumeration).
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = raw.len() == Self::LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(Error::InvalidInput(format!("malformed cache key '{}'", raw)));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

/// What enumeration reports about an entry without reading its payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMeta {
    pub key: CacheKey,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpirationPolicy {
    pub ttl: Duration,
}

impl ExpirationPolicy {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// An entry is expired once its age is strictly greater than the ttl.
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match TimeDelta::from_std(self.ttl) {
            Ok(ttl) => now.signed_duration_since(created_at) > ttl,
            Err(_) => false,
        }
    }
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

/// Advisory snapshot of the store at one point in time.
#[derive(Clone, Debug, Serialize)]
pub struct CacheStatistics {
    pub total_entries: u64,
    pub total_size_bytes: u64,
    pub total_size_formatted: String,
    pub expired_count: u64,
    pub location: String,
    pub backend: String,
    pub observed_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct CacheSettings {
    pub backend: StoreBackend,
    pub location: PathBuf,
    pub expiration: ExpirationPolicy,
    pub max_entries: Option<u64>,
}

impl CacheSettings {
    pub fn new(backend: StoreBackend, location: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            location: location.into(),
            expiration: ExpirationPolicy::default(),
            max_entries: None,
        }
    }

    pub fn with_expiration(mut self, expiration: ExpirationPolicy) -> Self {
        self.expiration = expiration;
        self
    }
}

impl From<&Config> for CacheSettings {
    fn from(config: &Config) -> Self {
        Self {
            backend: config.cache_backend,
            location: config.cache_dir.clone(),
            expiration: ExpirationPolicy::new(config.cache_ttl),
            max_entries: config.cache_max_entries,
        }
    }
}

/// One call into the read-through flow.
#[derive(Clone, Debug)]
pub struct TranslationRequest {
    pub content: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
    pub content_type: ContentType,
    pub tenant: TenantScope,
    pub surrogate_id: Option<String>,
}

impl TranslationRequest {
    pub fn new(content: impl Into<String>, from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            content: content.into(),
            from: LanguageCode::new(from)?,
            to: LanguageCode::new(to)?,
            content_type: ContentType::Generic,
            tenant: TenantScope::global(),
            surrogate_id: None,
        })
    }

    /// Post body cached under the post id rather than its text.
    pub fn for_post(post_id: u64, content: impl Into<String>, from: &str, to: &str) -> Result<Self> {
        Ok(Self::new(content, from, to)?
            .with_content_type(ContentType::Post)
            .with_surrogate_id(post_id.to_string()))
    }

    pub fn for_title(post_id: u64, title: impl Into<String>, from: &str, to: &str) -> Result<Self> {
        Ok(Self::new(title, from, to)?
            .with_content_type(ContentType::Title)
            .with_surrogate_id(post_id.to_string()))
    }

    pub fn for_menu_item(title: impl Into<String>, from: &str, to: &str) -> Result<Self> {
        Ok(Self::new(title, from, to)?.with_content_type(ContentType::MenuItem))
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_tenant(mut self, tenant: TenantScope) -> Self {
        self.tenant = tenant;
        self
    }

    pub fn with_surrogate_id(mut self, id: impl Into<String>) -> Self {
        self.surrogate_id = Some(id.into());
        self
    }

    pub fn fingerprint(&self) -> Fingerprint<'_> {
        match &self.surrogate_id {
            Some(id) => Fingerprint::Id(id),
            None => Fingerprint::Text(&self.content),
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        KeyDeriver::derive(
            &self.tenant,
            self.fingerprint(),
            &self.from,
            &self.to,
            self.content_type,
        )
    }
}
