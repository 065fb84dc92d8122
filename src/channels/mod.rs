//! DVB channel list handling
//!
//! The media shard's channel entries come from a VDR-style `channels.conf`
//! file. Parsing runs as an asynchronous contributor: the startup code
//! registers a contribution, spawns [`stage_channels`] with the raw payload
//! and the multicast pool, and commits once the whole list is staged. A
//! malformed list fails the contribution, which aborts the seeding
//! transaction.

pub mod conf;
pub mod error;

pub use conf::{parse_channels, stage_channels, Channel};
pub use error::ChannelError;
