//! # Resolution Cache
//!
//! Cache contract used by [`crate::DidResolver`] plus two implementations: [`NoOpCache`], the
//! default, which never stores anything, and [`MemoryCache`], an in-process map with an optional
//! time-to-live.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::Err;
use crate::resolution::DidResolutionResult;
use crate::{tracerr, Result};

/// Cache of resolution results keyed by the exact DID string.
///
/// Implementations serialize their own internal access.
#[async_trait]
pub trait ResolutionCache: Send + Sync {
    /// Get the cached result for `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<DidResolutionResult>>;

    /// Store `value` under `key`, replacing any existing entry.
    async fn set(&self, key: &str, value: &DidResolutionResult) -> Result<()>;

    /// Remove the entry for `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove every entry.
    async fn clear(&self) -> Result<()>;

    /// Release any resources held by the cache.
    async fn close(&self) -> Result<()>;
}

/// A cache that stores nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpCache;

#[async_trait]
impl ResolutionCache for NoOpCache {
    async fn get(&self, _: &str) -> Result<Option<DidResolutionResult>> {
        Ok(None)
    }

    async fn set(&self, _: &str, _: &DidResolutionResult) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct Entry {
    value: DidResolutionResult,
    stored: Instant,
}

/// In-memory cache. Entries older than the time-to-live, when one is set, are treated as absent.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Create a cache whose entries never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Number of entries held, including expired entries not yet evicted.
    ///
    /// # Errors
    ///
    /// Returns [`Err::InternalError`] if the cache lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// True when the cache holds no entries.
    ///
    /// # Errors
    ///
    /// Returns [`Err::InternalError`] if the cache lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>> {
        match self.entries.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => tracerr!(Err::InternalError, "resolution cache lock poisoned"),
        }
    }

    fn expired(&self, entry: &Entry) -> bool {
        self.ttl.is_some_and(|ttl| entry.stored.elapsed() >= ttl)
    }
}

#[async_trait]
impl ResolutionCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<DidResolutionResult>> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if self.expired(entry) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &DidResolutionResult) -> Result<()> {
        let entry = Entry {
            value: value.clone(),
            stored: Instant::now(),
        };
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.clear().await
    }
}
