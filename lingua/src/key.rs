//! Cache key derivation.
//!
//! Every field is written with a presence marker and a length prefix before it
//! is hashed, so no two distinct field combinations share a preimage.

use sha2::{Digest, Sha256};

use crate::domain::{CacheKey, ContentType, Fingerprint, LanguageCode, TenantScope};

const KEY_VERSION: &[u8] = b"lingua-cache-key/v1";

pub struct KeyDeriver;

impl KeyDeriver {
    pub fn derive(
        tenant: &TenantScope,
        fingerprint: Fingerprint<'_>,
        from: &LanguageCode,
        to: &LanguageCode,
        content_type: ContentType,
    ) -> CacheKey {
        let mut hasher = Sha256::new();
        hasher.update(KEY_VERSION);

        write_field(&mut hasher, b"type", Some(content_type.as_str()));
        write_field(&mut hasher, b"site", tenant.site.as_deref());
        write_field(&mut hasher, b"network", tenant.network.as_deref());
        match fingerprint {
            Fingerprint::Text(text) => write_field(&mut hasher, b"text", Some(text)),
            Fingerprint::Id(id) => write_field(&mut hasher, b"id", Some(id)),
        }
        write_field(&mut hasher, b"from", Some(from.as_str()));
        write_field(&mut hasher, b"to", Some(to.as_str()));

        CacheKey::from_digest(&hasher.finalize())
    }
}

fn write_field(hasher: &mut Sha256, name: &[u8], value: Option<&str>) {
    hasher.update((name.len() as u64).to_be_bytes());
    hasher.update(name);
    match value {
        None => hasher.update([0u8]),
        Some(value) => {
            hasher.update([1u8]);
            hasher.update((value.len() as u64).to_be_bytes());
            hasher.update(value.as_bytes());
        }
    }
}
