//! Entry data model
//!
//! Entries are the records a transaction stages into a shard: a named,
//! typed bag of fields. Field payloads are opaque JSON; this crate stores
//! them verbatim and never interprets them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a shard
///
/// `alias` is the entry's unique name within its shard, `kind` names the
/// entity type the consuming framework instantiates from it, and `fields`
/// carries the payload untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique name within the shard
    pub alias: String,
    /// Entity type identifier, e.g. `"dvb-channel"` or `"stream"`
    pub kind: String,
    /// Opaque payload, stored verbatim
    pub fields: Value,
}

impl Entry {
    pub fn new(alias: impl Into<String>, kind: impl Into<String>, fields: Value) -> Self {
        Self {
            alias: alias.into(),
            kind: kind.into(),
            fields,
        }
    }
}

/// Relational pointer from one entry to another
///
/// Serialized into entry fields and resolved by the consuming framework
/// after the batch is visible, so a reference may name an alias that is
/// staged later in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    /// Alias of the referenced entry
    pub entry: String,
    /// Alias of the shard holding the referenced entry
    pub shard: String,
}

impl EntryRef {
    pub fn new(entry: impl Into<String>, shard: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            shard: shard.into(),
        }
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.shard, self.entry)
    }
}

/// Handle to an entry staged in a transaction
///
/// Returned by [`ShardTransaction::add`](super::ShardTransaction::add).
/// The handle names the staged entry so later entries can point at it
/// before anything is committed.
#[derive(Debug, Clone)]
pub struct EntryHandle {
    alias: String,
    shard: String,
}

impl EntryHandle {
    pub(crate) fn new(alias: String, shard: String) -> Self {
        Self { alias, shard }
    }

    /// Alias of the staged entry
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Shard the entry is staged for
    pub fn shard(&self) -> &str {
        &self.shard
    }

    /// Builds a relational pointer to the staged entry
    pub fn entry_ref(&self) -> EntryRef {
        EntryRef::new(self.alias.clone(), self.shard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_ref_display() {
        let r = EntryRef::new("playback", "media-control");
        assert_eq!(r.to_string(), "media-control/playback");
    }

    #[test]
    fn test_entry_ref_serializes_into_fields() {
        let r = EntryRef::new("playback", "media");
        let fields = json!({ "name": "Media Player", "playback": r });
        assert_eq!(fields["playback"]["entry"], "playback");
        assert_eq!(fields["playback"]["shard"], "media");
    }

    #[test]
    fn test_handle_builds_matching_ref() {
        let handle = EntryHandle::new("volume".to_string(), "media".to_string());
        assert_eq!(handle.alias(), "volume");
        assert_eq!(handle.shard(), "media");
        assert_eq!(handle.entry_ref(), EntryRef::new("volume", "media"));
    }

    #[test]
    fn test_entry_round_trips_through_json() {
        let entry = Entry::new("ch1", "dvb-channel", json!({ "frequency": 11837 }));
        let text = serde_json::to_string(&entry).unwrap();
        let back: Entry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }
}
