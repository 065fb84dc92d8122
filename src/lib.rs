//! Transactional shard seeding for media applications
//!
//! A shard is a logical partition of a space in the host entity framework;
//! seeding one means creating its initial entries, such as a volume
//! control, a playback control, and one entry per DVB channel, as a single
//! atomic batch. This crate provides the two pieces of that startup flow
//! with actual machinery behind them:
//!
//! - [`pool`] — a multicast address pool that hands each streaming channel
//!   its own address, lowest-free-first so assignments are reproducible.
//! - [`shard`] — an all-or-nothing transaction that collects entries from
//!   startup code and from asynchronous contributors (like a channel list
//!   parser) and realizes the whole batch with one store call.
//!
//! [`channels`] is the stock contributor for VDR-style `channels.conf`
//! payloads, and [`config`] holds the serde types a host uses to describe
//! a shard's static content declaratively. Everything else the framework
//! does with the seeded entries — scheduling, replication, playback — is
//! out of scope; entries reference those collaborators by opaque
//! identifiers only.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use serde_json::json;
//! use shardseed::channels::stage_channels;
//! use shardseed::pool::{McastPool, McastRange};
//! use shardseed::shard::{MemoryStore, ShardTransaction};
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! let range = McastRange::new(
//!     "239.255.0.1".parse().unwrap(),
//!     "239.255.255.254".parse().unwrap(),
//! ).unwrap();
//! let pool = Arc::new(McastPool::new(range));
//!
//! let txn = ShardTransaction::new("media", Arc::clone(&store));
//! let volume = txn.add("volume", "volume-control", json!({ "name": "PulseAudio" })).unwrap();
//! txn.add("player", "aggregator", json!({ "volume": volume.entry_ref() })).unwrap();
//!
//! let feed = txn.contributor("dvb-channels").unwrap();
//! tokio::spawn(stage_channels(
//!     feed,
//!     Bytes::from_static(b"ZDF;ZDFvision:11954:hC34:S19.2E:27500:110"),
//!     Arc::clone(&pool),
//! ));
//!
//! txn.commit().await.unwrap();
//! assert_eq!(store.entry_count("media").await, 3);
//! # });
//! ```

pub mod channels;
pub mod config;
pub mod error;
pub mod pool;
pub mod shard;

pub use error::{Error, Result};
