use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

/// A set whose members lapse `ttl` after they were last added.
#[derive(Debug, Clone)]
pub struct TimedSet<T> {
    ttl: Duration,
    entries: HashMap<T, Instant>,
}

impl<T: Hash + Eq> TimedSet<T> {
    /// Creates an empty set with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Adds `value`, or refreshes its timestamp if already present.
    pub fn add(&mut self, value: T) {
        self.entries.insert(value, Instant::now());
    }

    /// Returns `true` if `value` was added less than `ttl` ago.
    ///
    /// A stale entry is removed as a side effect.
    pub fn contains<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get(value) {
            Some(written) if written.elapsed() < self.ttl => true,
            Some(_) => {
                self.entries.remove(value);
                false
            }
            None => false,
        }
    }

    /// Removes `value`. Returns `true` if it was stored (fresh or stale).
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(value).is_some()
    }

    /// Drops every stale entry and returns how many were dropped.
    pub fn sweep(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, written| written.elapsed() < ttl);
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
