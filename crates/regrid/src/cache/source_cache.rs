//! Single-entry cache implementation.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::regridder::PreparedSource;
use crate::types::CacheStats;

/// Cache holding at most one `(key, value)` pair.
///
/// A lookup with a different key discards the held value before building
/// the new one. Requires `&mut self`; not meant to be shared across
/// threads.
#[derive(Debug)]
pub struct SingleEntryCache<K, V> {
    entry: Option<(K, V)>,
    stats: CacheStats,
}

impl<K, V> Default for SingleEntryCache<K, V> {
    fn default() -> Self {
        Self {
            entry: None,
            stats: CacheStats::default(),
        }
    }
}

impl<K: PartialEq + Debug, V> SingleEntryCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the held value, if any.
    pub fn key(&self) -> Option<&K> {
        self.entry.as_ref().map(|(k, _)| k)
    }

    /// Held value if it was stored under `key`. Does not touch the stats.
    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.entry {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// Return the value for `key`, building it with `build` on a miss.
    ///
    /// On a miss the previous entry is dropped before `build` runs. If
    /// `build` fails the cache is left empty.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, build: F) -> Result<&V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let entry = match self.entry.take() {
            Some((k, v)) if k == key => {
                self.stats.hits += 1;
                (k, v)
            }
            previous => {
                self.stats.misses += 1;
                if let Some((old, stale)) = previous {
                    drop(stale);
                    self.stats.evictions += 1;
                    debug!(old = ?old, new = ?key, "Replacing cached entry");
                }
                let value = build()?;
                (key, value)
            }
        };
        Ok(&self.entry.insert(entry).1)
    }

    /// Store `value` under `key`, returning the entry it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let previous = self.entry.replace((key, value));
        if previous.is_some() {
            self.stats.evictions += 1;
        }
        previous
    }

    /// Drop the held entry.
    pub fn invalidate(&mut self) -> Option<(K, V)> {
        let previous = self.entry.take();
        if let Some((key, _)) = &previous {
            self.stats.evictions += 1;
            debug!(key = ?key, "Invalidated cached entry");
        }
        previous
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }
}

/// Prepared source of the most recent scene, keyed by acquisition time.
pub type SourceCache<T> = SingleEntryCache<DateTime<Utc>, PreparedSource<T>>;
