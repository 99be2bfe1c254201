#![deny(clippy::all)]

//! Translation cache core: key derivation, storage ports, the read-through
//! translation flow and the administrative control plane.

pub mod clock;
pub mod domain;
pub mod i18n;
pub mod key;
pub mod language;
pub mod planes;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    CacheEntry, CacheKey, CacheSettings, CacheStatistics, ContentType, EntryMeta,
    ExpirationPolicy, Fingerprint, LanguageCode, TenantScope, TranslationRequest,
};
pub use key::KeyDeriver;
pub use ports::{CacheStore, StorageFactory, Translator};
pub use planes::control::{AdminOperations, CacheAdmin, CleanupScheduler, StatsCollector};
pub use planes::data::{
    Origin, Resolved, TranslationOperations, TranslationService, TranslationSession,
};
