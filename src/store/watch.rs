//! In-memory watch store.
//!
//! Maps `(guild, user)` to routing settings. Lookups take a read lock,
//! writes a write lock, so message events never observe a partially
//! written entry. The persistence mirror is best-effort: a failed
//! durable write is logged and the in-memory entry stands.

use std::collections::HashMap;
use std::sync::Arc;

use serenity::model::id::{ChannelId, GuildId, UserId};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::common::error::StoreResult;
use crate::store::persist::{Persistence, PersistedEntry};

/// Routing settings for one watched user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchEntry {
    /// Destination channel; `None` replies where the message arrived.
    pub channel: Option<ChannelId>,
    /// Replacement rate as a fraction; `None` uses the engine default.
    pub rate: Option<f32>,
}

/// Concurrent map of watched users, mirrored to durable storage.
pub struct WatchStore {
    entries: RwLock<HashMap<(GuildId, UserId), WatchEntry>>,
    persistence: Arc<dyn Persistence>,
}

impl WatchStore {
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            persistence,
        }
    }

    /// Seed the map from durable storage. Called once at startup.
    ///
    /// `resolve` reports whether a persisted destination channel still
    /// exists; entries pointing at a vanished channel are kept with no
    /// destination rather than dropped.
    pub async fn load<F>(&self, resolve: F) -> StoreResult<usize>
    where
        F: Fn(GuildId, ChannelId) -> bool,
    {
        let persisted = self.persistence.load_all().await?;
        let mut entries = self.entries.write().await;
        entries.clear();
        for row in persisted {
            info!(
                "Loading saved settings: community: {}; user: {}",
                row.community, row.user
            );
            let channel = row.channel.filter(|&channel| resolve(row.community, channel));
            entries.insert(
                (row.community, row.user),
                WatchEntry {
                    channel,
                    rate: row.rate,
                },
            );
        }
        Ok(entries.len())
    }

    /// Pure read; safe under concurrent writers.
    pub async fn lookup(&self, community: GuildId, user: UserId) -> Option<WatchEntry> {
        self.entries.read().await.get(&(community, user)).copied()
    }

    /// Replace any existing entry for the key with `entry`. No field
    /// merging: the new entry stands as given.
    pub async fn upsert(&self, community: GuildId, user: UserId, entry: WatchEntry) {
        self.entries.write().await.insert((community, user), entry);
        let row = PersistedEntry {
            community,
            user,
            channel: entry.channel,
            rate: entry.rate,
        };
        if let Err(e) = self.persistence.upsert(&row).await {
            warn!(
                "Failed to persist watch entry for user {} in {}: {}",
                user, community, e
            );
        }
    }

    /// Remove a single watched user. Removing an absent key is a no-op.
    #[allow(dead_code)]
    pub async fn remove_user(&self, community: GuildId, user: UserId) {
        self.entries.write().await.remove(&(community, user));
        if let Err(e) = self.persistence.remove_user(community, user).await {
            warn!(
                "Failed to remove persisted entry for user {} in {}: {}",
                user, community, e
            );
        }
    }

    /// Remove every entry of a community; returns how many were removed.
    pub async fn remove_community(&self, community: GuildId) -> usize {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|&(entry_community, _), _| entry_community != community);
            before - entries.len()
        };
        if let Err(e) = self.persistence.remove_community(community).await {
            warn!("Failed to clear persisted entries for {}: {}", community, e);
        }
        removed
    }
}
