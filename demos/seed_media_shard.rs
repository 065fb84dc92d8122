//! End-to-end media shard seeding example
//!
//! Run with: cargo run --example seed_media_shard
//!
//! Mirrors the startup flow of a media-player deployment: the static
//! entries (volume control, playback control, address pool marker, the
//! player aggregator and a couple of file streams) come from a declarative
//! ShardSpec, the DVB channels come from a channels.conf payload parsed by
//! an asynchronous contributor, and everything lands in the store as one
//! atomic batch. Set RUST_LOG=debug to watch the staging happen.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;

use shardseed::channels::stage_channels;
use shardseed::config::ShardSpec;
use shardseed::shard::{MemoryStore, ShardTransaction};

const SHARD_SPEC: &str = r#"{
    "shard": "media",
    "pool": { "start": "239.255.0.1", "end": "239.255.255.254" },
    "entries": [
        { "alias": "volume",   "kind": "volume-control",   "fields": { "name": "PulseAudio" } },
        { "alias": "playback", "kind": "playback-control", "fields": { "name": "VLC" } },
        { "alias": "mcast",    "kind": "address-pool",     "fields": { "start": "239.255.0.1", "end": "239.255.255.254" } },
        { "alias": "stream1",  "kind": "stream",           "fields": { "url": "file:///srv/media/intro.mp4" } },
        { "alias": "stream2",  "kind": "stream",           "fields": { "url": "file:///srv/media/loop.mp4" } }
    ]
}"#;

const CHANNELS_CONF: &str = "\
# German satellite channels
Das Erste;ARD:11837:hC34:S19.2E:27500:101:102:104:0:28106:1:1101:0
ZDF;ZDFvision:11954:hC34:S19.2E:27500:110:120:130:0:28006:1:1079:0
arte:10744:hC56:S19.2E:22000:401:402:404:0:28724:1:1051:0
";

#[tokio::main]
async fn main() -> shardseed::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let spec: ShardSpec = serde_json::from_str(SHARD_SPEC).expect("embedded spec is valid");
    let pool = Arc::new(spec.pool.as_ref().expect("spec configures a pool").build()?);
    let store = Arc::new(MemoryStore::new());

    let txn = ShardTransaction::new(&spec.shard, Arc::clone(&store));
    let statics = spec.stage(&txn)?;

    // The player aggregates the controls; the channel entries it will play
    // are forward references resolved by the framework after commit.
    txn.add(
        "player",
        "aggregator",
        json!({
            "volume": statics[0].entry_ref(),
            "playback": statics[1].entry_ref(),
            "first": { "entry": "ch1", "shard": spec.shard.clone() },
        }),
    )?;

    let feed = txn.contributor("dvb-channels")?;
    tokio::spawn(stage_channels(
        feed,
        Bytes::from_static(CHANNELS_CONF.as_bytes()),
        Arc::clone(&pool),
    ));

    txn.commit().await?;

    println!("shard {:?} seeded:", spec.shard);
    for entry in store.list(&spec.shard).await {
        println!("  {:<10} {:<18} {}", entry.alias, entry.kind, entry.fields);
    }
    let stats = pool.stats();
    println!(
        "pool: {} of {} addresses allocated",
        stats.allocated, stats.capacity
    );
    Ok(())
}
