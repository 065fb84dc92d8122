//! Entry store seam
//!
//! Commit hands the whole staged batch to an [`EntryStore`] in one call.
//! The trait is the boundary between this crate and the host's record
//! store; [`MemoryStore`] is the in-process implementation used by tests
//! and demos.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::entry::Entry;
use super::error::StoreError;

/// Per-shard record store consumed by commit
///
/// `apply` must realize the whole batch or none of it. Backends without
/// native multi-record atomicity have to simulate it: validate everything
/// up front, or compensate on partial failure. Entries from a batch must
/// not become observable one by one.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Realizes every entry of the batch in the given shard
    async fn apply(&self, shard: &str, entries: Vec<Entry>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: EntryStore + ?Sized> EntryStore for Arc<S> {
    async fn apply(&self, shard: &str, entries: Vec<Entry>) -> Result<(), StoreError> {
        (**self).apply(shard, entries).await
    }
}

/// In-memory entry store
///
/// Keeps one alias-keyed map per shard behind an async `RwLock`. Batches
/// are validated in full before the first insert, so a rejected batch
/// leaves the store untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    shards: RwLock<HashMap<String, HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up one entry by shard and alias
    pub async fn get(&self, shard: &str, alias: &str) -> Option<Entry> {
        let shards = self.shards.read().await;
        shards.get(shard)?.get(alias).cloned()
    }

    /// Returns every entry of a shard, sorted by alias
    pub async fn list(&self, shard: &str) -> Vec<Entry> {
        let shards = self.shards.read().await;
        let mut entries: Vec<Entry> = shards
            .get(shard)
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| a.alias.cmp(&b.alias));
        entries
    }

    /// Number of entries in a shard
    pub async fn entry_count(&self, shard: &str) -> usize {
        let shards = self.shards.read().await;
        shards.get(shard).map(|s| s.len()).unwrap_or(0)
    }

    /// Returns true when the shard holds an entry with this alias
    pub async fn contains(&self, shard: &str, alias: &str) -> bool {
        let shards = self.shards.read().await;
        shards.get(shard).is_some_and(|s| s.contains_key(alias))
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn apply(&self, shard: &str, entries: Vec<Entry>) -> Result<(), StoreError> {
        let mut shards = self.shards.write().await;
        let existing = shards.entry(shard.to_string()).or_default();

        // Validate the whole batch before touching the map.
        let mut batch_aliases = HashSet::new();
        for entry in &entries {
            if existing.contains_key(&entry.alias) || !batch_aliases.insert(&entry.alias) {
                return Err(StoreError::DuplicateAlias {
                    shard: shard.to_string(),
                    alias: entry.alias.clone(),
                });
            }
        }

        let count = entries.len();
        for entry in entries {
            existing.insert(entry.alias.clone(), entry);
        }
        tracing::debug!(shard = %shard, entries = count, "Batch applied to store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_apply_realizes_batch() {
        let store = MemoryStore::new();
        store
            .apply(
                "media",
                vec![
                    Entry::new("volume", "volume-control", json!({ "name": "PulseAudio" })),
                    Entry::new("playback", "playback-control", json!({ "name": "VLC" })),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.entry_count("media").await, 2);
        let volume = store.get("media", "volume").await.unwrap();
        assert_eq!(volume.kind, "volume-control");
        assert_eq!(volume.fields["name"], "PulseAudio");
    }

    #[tokio::test]
    async fn test_apply_rejects_existing_alias_without_changes() {
        let store = MemoryStore::new();
        store
            .apply("media", vec![Entry::new("ch1", "dvb-channel", json!({}))])
            .await
            .unwrap();

        let result = store
            .apply(
                "media",
                vec![
                    Entry::new("ch2", "dvb-channel", json!({})),
                    Entry::new("ch1", "dvb-channel", json!({})),
                ],
            )
            .await;

        assert!(matches!(
            result,
            Err(StoreError::DuplicateAlias { shard, alias }) if shard == "media" && alias == "ch1"
        ));
        // The valid half of the rejected batch must not have landed.
        assert!(!store.contains("media", "ch2").await);
        assert_eq!(store.entry_count("media").await, 1);
    }

    #[tokio::test]
    async fn test_apply_rejects_duplicate_within_batch() {
        let store = MemoryStore::new();
        let result = store
            .apply(
                "media",
                vec![
                    Entry::new("ch1", "dvb-channel", json!({ "frequency": 11837 })),
                    Entry::new("ch1", "dvb-channel", json!({ "frequency": 11954 })),
                ],
            )
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateAlias { .. })));
        assert_eq!(store.entry_count("media").await, 0);
    }

    #[tokio::test]
    async fn test_shards_are_independent() {
        let store = MemoryStore::new();
        store
            .apply("media", vec![Entry::new("player", "aggregator", json!({}))])
            .await
            .unwrap();
        store
            .apply("control", vec![Entry::new("player", "aggregator", json!({}))])
            .await
            .unwrap();

        assert_eq!(store.entry_count("media").await, 1);
        assert_eq!(store.entry_count("control").await, 1);
        assert!(store.get("settings", "player").await.is_none());
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_alias() {
        let store = MemoryStore::new();
        store
            .apply(
                "media",
                vec![
                    Entry::new("ch2", "dvb-channel", json!({})),
                    Entry::new("ch1", "dvb-channel", json!({})),
                    Entry::new("player", "aggregator", json!({})),
                ],
            )
            .await
            .unwrap();

        let aliases: Vec<String> = store
            .list("media")
            .await
            .into_iter()
            .map(|e| e.alias)
            .collect();
        assert_eq!(aliases, ["ch1", "ch2", "player"]);
    }
}
