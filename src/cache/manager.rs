//! Cache manager for widget data
//!
//! Provides a `CacheManager` that serves a cached payload while it is fresh
//! and otherwise runs the caller's fetcher and stores the result.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;
use super::fingerprint::fingerprint;
use crate::storage::KeyValueStore;

/// Freshness of a cache key for a given request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing usable is stored (missing or unreadable)
    Absent,
    /// Stored entry can be served as-is
    Fresh,
    /// Stored entry is too old or was produced by different parameters
    Stale,
}

/// Pull-based TTL cache keyed by name and request parameters
///
/// There is no locking: two concurrent `get` calls for the same stale key
/// both run their fetcher and the later write wins.
#[derive(Clone)]
pub struct CacheManager {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl CacheManager {
    /// Creates a cache over `storage` using wall-clock time
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    /// Creates a cache with a custom time source
    pub fn with_clock(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Storage slot for a cache key
    fn slot_key(key: &str) -> String {
        format!("cache.{}", key)
    }

    /// Returns the cached value for `key`, fetching it if needed.
    ///
    /// The stored payload is returned without calling `fetcher` when the
    /// entry was written less than `ttl` ago and with parameters that
    /// fingerprint the same as `params`. Otherwise `fetcher` runs and its
    /// result replaces the entry.
    ///
    /// Errors from `fetcher` are returned unchanged and leave the stored
    /// entry as it was. Unreadable entries count as misses, and failures to
    /// write the new entry are logged without failing the call.
    pub async fn get<T, P, F, Fut, E>(
        &self,
        key: &str,
        params: &P,
        ttl: Duration,
        fetcher: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        P: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let params_fingerprint = match fingerprint(params) {
            Ok(fp) => Some(fp),
            Err(e) => {
                log::warn!("cannot fingerprint parameters for '{}', bypassing cache: {}", key, e);
                None
            }
        };

        if let Some(fp) = &params_fingerprint {
            if let Some(entry) = self.read_entry::<T>(key) {
                if entry.params_fingerprint == *fp && self.is_fresh(entry.written_at, ttl) {
                    log::debug!("cache hit for '{}'", key);
                    return Ok(entry.payload);
                }
                log::debug!("cache entry for '{}' is stale", key);
            } else {
                log::debug!("cache miss for '{}'", key);
            }
        }

        let payload = fetcher().await?;

        if let Some(fp) = params_fingerprint {
            self.write_entry(key, &payload, fp);
        }
        Ok(payload)
    }

    /// Reports whether `get` would be served from cache, without fetching.
    pub fn status<P: Serialize + ?Sized>(
        &self,
        key: &str,
        params: &P,
        ttl: Duration,
    ) -> CacheStatus {
        let Some(entry) = self.read_entry::<serde_json::Value>(key) else {
            return CacheStatus::Absent;
        };
        match fingerprint(params) {
            Ok(fp) if fp == entry.params_fingerprint && self.is_fresh(entry.written_at, ttl) => {
                CacheStatus::Fresh
            }
            _ => CacheStatus::Stale,
        }
    }

    /// Reads the raw entry stored for `key`.
    ///
    /// Returns `None` if nothing is stored or the stored entry cannot be
    /// read or parsed as a `CacheEntry<T>`.
    pub fn read_entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let text = match self.storage.get(&Self::slot_key(key)) {
            Ok(text) => text?,
            Err(e) => {
                log::warn!("could not read cache entry '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("discarding unreadable cache entry '{}': {}", key, e);
                None
            }
        }
    }

    /// Whether an entry written at `written_at` is younger than `ttl`.
    ///
    /// Entries dated in the future are treated as stale.
    fn is_fresh(&self, written_at: DateTime<Utc>, ttl: Duration) -> bool {
        match self.clock.now().signed_duration_since(written_at).to_std() {
            Ok(elapsed) => elapsed < ttl,
            Err(_) => false,
        }
    }

    fn write_entry<T: Serialize>(&self, key: &str, payload: &T, params_fingerprint: String) {
        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            written_at: self.clock.now(),
            params_fingerprint,
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("could not serialize cache entry '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.storage.set(&Self::slot_key(key), &json) {
            log::warn!("could not write cache entry '{}': {}", key, e);
        }
    }
}
