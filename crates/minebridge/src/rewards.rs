//! Pending in-game rewards and where they are kept.
//!
//! A user's record maps server names to the command lines that grant their
//! rewards on that server. [`Bridge::deliver_rewards`] dispatches the list
//! for the server the player is currently on and, once the commands are
//! out, clears that list through the store.
//!
//! [`Bridge::deliver_rewards`]: crate::Bridge::deliver_rewards

use std::collections::HashMap;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// A community user's link to their game account and pending rewards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    /// The linked game account, if the user has linked one.
    #[serde(default)]
    pub minecraft_uuid: Option<String>,
    /// Server name → commands still to run there.
    #[serde(default)]
    pub reward_inventory: HashMap<String, Vec<String>>,
}

impl RewardRecord {
    pub fn new(minecraft_uuid: impl Into<String>) -> Self {
        Self {
            minecraft_uuid: Some(minecraft_uuid.into()),
            reward_inventory: HashMap::new(),
        }
    }

    /// Appends commands to the server's pending list.
    pub fn with_rewards<I, S>(mut self, server: &str, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reward_inventory
            .entry(server.to_owned())
            .or_default()
            .extend(commands.into_iter().map(Into::into));
        self
    }

    /// Pending commands for `server`, if any.
    pub fn pending_for(&self, server: &str) -> Option<&[String]> {
        self.reward_inventory
            .get(server)
            .map(Vec::as_slice)
            .filter(|list| !list.is_empty())
    }

    pub fn has_pending(&self) -> bool {
        self.reward_inventory.values().any(|list| !list.is_empty())
    }
}

/// Persistence for reward records.
///
/// Implement this over whatever database holds the community's users.
pub trait RewardStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the record for `user_id`, or `None` if the user is unknown.
    fn load(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<Option<RewardRecord>, Self::Error>> + Send;

    /// Empties the pending list for one server and persists the change.
    fn clear_server(
        &self,
        user_id: u64,
        server: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// An in-memory [`RewardStore`], for tests and single-process setups.
#[derive(Debug, Default)]
pub struct MemoryRewardStore {
    records: Mutex<HashMap<u64, RewardRecord>>,
}

impl MemoryRewardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces a user's record.
    pub async fn insert(&self, user_id: u64, record: RewardRecord) {
        self.records.lock().await.insert(user_id, record);
    }

    /// Returns a copy of a user's record.
    pub async fn get(&self, user_id: u64) -> Option<RewardRecord> {
        self.records.lock().await.get(&user_id).cloned()
    }
}

impl RewardStore for MemoryRewardStore {
    type Error = Infallible;

    async fn load(&self, user_id: u64) -> Result<Option<RewardRecord>, Infallible> {
        Ok(self.get(user_id).await)
    }

    async fn clear_server(&self, user_id: u64, server: &str) -> Result<(), Infallible> {
        if let Some(record) = self.records.lock().await.get_mut(&user_id) {
            if let Some(list) = record.reward_inventory.get_mut(server) {
                list.clear();
            }
        }
        Ok(())
    }
}
