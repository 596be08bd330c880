use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    written: Instant,
}

/// A map whose entries lapse `ttl` after they were last set.
#[derive(Debug, Clone)]
pub struct TimedMap<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Hash + Eq, V> TimedMap<K, V> {
    /// Creates an empty map with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Stores `value` under `key` with a fresh timestamp.
    ///
    /// Returns the previous value if it was still live.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let ttl = self.ttl;
        self.entries
            .insert(
                key,
                Entry {
                    value,
                    written: Instant::now(),
                },
            )
            .filter(|old| old.written.elapsed() < ttl)
            .map(|old| old.value)
    }

    /// Returns the value for `key` if it was set less than `ttl` ago.
    ///
    /// A stale entry is removed as a side effect.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let stale = self
            .entries
            .get(key)
            .is_some_and(|e| e.written.elapsed() >= self.ttl);
        if stale {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| &e.value)
    }

    /// Returns `true` if `key` has a live value.
    pub fn contains_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value if it was still live.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let ttl = self.ttl;
        self.entries
            .remove(key)
            .filter(|e| e.written.elapsed() < ttl)
            .map(|e| e.value)
    }

    /// Drops every stale entry and returns how many were dropped.
    pub fn sweep(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.written.elapsed() < ttl);
        before - self.entries.len()
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
