//! Short-lived knowledge about players, filled in by game-server reports.
//!
//! Keys are whatever identifies the player: a username or a UUID. A report
//! that carries both stores under both, so a later lookup by either hits.
//! All four caches share one TTL.

use std::time::Duration;

use minebridge_cache::{TimedMap, TimedSet};

#[derive(Debug)]
pub(crate) struct PresenceCache {
    online: TimedSet<String>,
    locations: TimedMap<String, String>,
    uuid_by_name: TimedMap<String, String>,
    name_by_uuid: TimedMap<String, String>,
}

impl PresenceCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            online: TimedSet::new(ttl),
            locations: TimedMap::new(ttl),
            uuid_by_name: TimedMap::new(ttl),
            name_by_uuid: TimedMap::new(ttl),
        }
    }

    /// Marks the player online under every key present.
    pub(crate) fn record_online(
        &mut self,
        username: Option<&str>,
        uuid: Option<&str>,
    ) {
        if let Some(name) = username {
            self.online.add(name.to_owned());
        }
        if let Some(uuid) = uuid {
            self.online.add(uuid.to_owned());
        }
        if let (Some(name), Some(uuid)) = (username, uuid) {
            self.uuid_by_name.insert(name.to_owned(), uuid.to_owned());
            self.name_by_uuid.insert(uuid.to_owned(), name.to_owned());
        }
    }

    /// Records which server the player is on under every key present.
    pub(crate) fn record_location(
        &mut self,
        username: Option<&str>,
        uuid: Option<&str>,
        server: &str,
    ) {
        for key in [username, uuid].into_iter().flatten() {
            self.locations.insert(key.to_owned(), server.to_owned());
        }
        if let (Some(name), Some(uuid)) = (username, uuid) {
            self.uuid_by_name.insert(name.to_owned(), uuid.to_owned());
            self.name_by_uuid.insert(uuid.to_owned(), name.to_owned());
        }
    }

    pub(crate) fn is_online(&mut self, key: &str) -> bool {
        self.online.contains(key)
    }

    pub(crate) fn server_of(&mut self, key: &str) -> Option<String> {
        self.locations.get(key).cloned()
    }

    pub(crate) fn uuid_of(&mut self, username: &str) -> Option<String> {
        self.uuid_by_name.get(username).cloned()
    }

    pub(crate) fn username_of(&mut self, uuid: &str) -> Option<String> {
        self.name_by_uuid.get(uuid).cloned()
    }

    /// Drops every expired entry. Returns how many went.
    pub(crate) fn sweep(&mut self) -> usize {
        self.online.sweep()
            + self.locations.sweep()
            + self.uuid_by_name.sweep()
            + self.name_by_uuid.sweep()
    }
}
