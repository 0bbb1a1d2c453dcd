//! In-process TTL cache of lookup results.
//!
//! Keys are SHA-256 digests of the namespace plus canonicalized, name-sorted
//! parameters, so `"la verne"` and `" LA  VERNE "` share an entry while an
//! address and a parcel lookup never do.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use propdata_core::LookupResult;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Address,
    Parcel,
}

impl Namespace {
    fn as_str(self) -> &'static str {
        match self {
            Namespace::Address => "address",
            Namespace::Parcel => "parcel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: Namespace,
    digest: String,
}

impl CacheKey {
    #[must_use]
    pub fn address(street: &str, city: Option<&str>, state: Option<&str>, zip: Option<&str>) -> Self {
        Self::hashed(
            Namespace::Address,
            &mut [
                ("street", Some(street)),
                ("city", city),
                ("state", state),
                ("zip", zip),
            ],
        )
    }

    #[must_use]
    pub fn parcel(apn: &str, fips: &str) -> Self {
        Self::hashed(Namespace::Parcel, &mut [("apn", Some(apn)), ("fips", Some(fips))])
    }

    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn hashed(namespace: Namespace, params: &mut [(&str, Option<&str>)]) -> Self {
        params.sort_by_key(|(name, _)| *name);
        let input = params
            .iter()
            .map(|(name, value)| format!("{name}={}", canonicalize(value.unwrap_or(""))))
            .collect::<Vec<_>>()
            .join("&");
        let input = format!("{}|{input}", namespace.as_str());
        Self {
            namespace,
            digest: format!("{:x}", Sha256::digest(input.as_bytes())),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace.as_str(), &self.digest[..12])
    }
}

/// Trims, uppercases and collapses internal whitespace runs to one space.
#[must_use]
pub fn canonicalize(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

struct Entry {
    value: LookupResult,
    stored_at: Instant,
}

/// TTL map shared by all clones of an [`crate::EnrichmentClient`].
///
/// A zero TTL disables storage entirely.
pub struct LookupCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, Entry>>,
}

impl LookupCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored value, evicting it first if it has expired.
    pub async fn get(&self, key: &CacheKey) -> Option<LookupResult> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Another task may have stored a fresh value between the two locks.
        if let Some(entry) = entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            entries.remove(key);
            tracing::debug!(%key, "evicted expired cache entry");
        }
        None
    }

    /// Stores `value`, replacing any existing entry under `key`.
    pub async fn put(&self, key: CacheKey, value: LookupResult) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.write().await.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        tracing::info!(dropped, "lookup cache cleared");
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
