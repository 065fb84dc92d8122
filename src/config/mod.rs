//! Declarative seeding input
//!
//! Hosts describe a shard's initial content as data: an optional multicast
//! pool range and an ordered list of static entries. The structures are
//! serde types so the description can live in a JSON config file; staging
//! them is the first step of shard initialization, before any asynchronous
//! contributor output arrives.
//!
//! ```
//! use shardseed::config::ShardSpec;
//!
//! let spec: ShardSpec = serde_json::from_str(r#"{
//!     "shard": "media",
//!     "pool": { "start": "239.255.0.1", "end": "239.255.255.254" },
//!     "entries": [
//!         { "alias": "volume", "kind": "volume-control", "fields": { "name": "PulseAudio" } }
//!     ]
//! }"#).unwrap();
//! assert_eq!(spec.shard, "media");
//! ```

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pool::{McastPool, McastRange, PoolError};
use crate::shard::{EntryHandle, EntryStore, ShardTransaction, TransactionError};

/// Multicast pool range as configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSpec {
    /// First address of the range
    pub start: Ipv4Addr,
    /// Last address of the range, inclusive
    pub end: Ipv4Addr,
}

impl PoolSpec {
    /// Builds an empty pool over the configured range
    ///
    /// Validation happens here, not at deserialization time, so a config
    /// with a bad range still loads and reports the error when the pool is
    /// actually wired up.
    pub fn build(&self) -> Result<McastPool, PoolError> {
        Ok(McastPool::new(McastRange::new(self.start, self.end)?))
    }
}

/// One static entry to stage at seeding time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySpec {
    /// Shard-unique alias
    pub alias: String,
    /// Entity type identifier
    pub kind: String,
    /// Opaque payload, staged verbatim
    #[serde(default)]
    pub fields: Value,
}

/// Declarative description of one shard's initial content
///
/// The pool is opt-in; deployments without multicast streaming leave it
/// out and the channel contributor is simply not wired up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardSpec {
    /// Alias of the shard to seed
    pub shard: String,
    /// Multicast pool configuration, when this deployment streams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolSpec>,
    /// Static entries, staged in declaration order
    #[serde(default)]
    pub entries: Vec<EntrySpec>,
}

impl ShardSpec {
    /// Stages every static entry into the transaction, in declaration order
    ///
    /// Returns the handles in the same order, so callers can wire
    /// references from later, dynamically built entries. The first staging
    /// failure is returned as is; entries staged before it remain staged
    /// and are discarded with the rest if the caller aborts.
    pub fn stage<S: EntryStore>(
        &self,
        txn: &ShardTransaction<S>,
    ) -> Result<Vec<EntryHandle>, TransactionError> {
        let mut handles = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            handles.push(txn.add(&entry.alias, &entry.kind, entry.fields.clone())?);
        }
        tracing::debug!(
            shard = %self.shard,
            entries = handles.len(),
            "Static entries staged"
        );
        Ok(handles)
    }
}
