//! channels.conf parsing and staging
//!
//! Parses VDR-style `channels.conf` payloads and stages one `dvb-channel`
//! entry per channel into an open transaction, assigning each channel its
//! own multicast address from the pool.
//!
//! A channel line is colon-separated; the name field may carry a provider
//! after a semicolon:
//!
//! ```text
//! Das Erste;ARD:11837:hC34:S19.2E:27500:101:102:104:0:28106:1:1101:0
//! ```
//!
//! Blank lines and lines starting with `#` or `;` are skipped. Any other
//! line that does not parse fails the whole list; a truncated channel set
//! must never be committed.

use std::net::Ipv4Addr;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{json, Value};

use crate::pool::McastPool;
use crate::shard::{Contribution, EntryStore};

use super::error::ChannelError;

/// One parsed channel definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Channel name
    pub name: String,
    /// Provider from the name field, when present
    pub provider: Option<String>,
    /// Transponder frequency, unit as listed
    pub frequency: u32,
    /// Modulation parameter string, e.g. `hC34`
    pub parameters: String,
    /// Signal source, e.g. `S19.2E`
    pub source: String,
    /// Symbol rate
    pub symbol_rate: u32,
}

impl Channel {
    fn entry_fields(&self, mcast: Ipv4Addr) -> Value {
        json!({
            "name": self.name,
            "provider": self.provider,
            "frequency": self.frequency,
            "parameters": self.parameters,
            "source": self.source,
            "symbol_rate": self.symbol_rate,
            "mcast": mcast.to_string(),
        })
    }
}

/// Parses a whole channel list
///
/// Returns the retained channels in file order, or the first
/// [`ChannelError::BadLine`] with its 1-based line number.
pub fn parse_channels(input: &str) -> Result<Vec<Channel>, ChannelError> {
    let mut channels = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let channel = parse_line(line).map_err(|reason| ChannelError::BadLine {
            line: idx + 1,
            reason,
        })?;
        channels.push(channel);
    }
    Ok(channels)
}

fn parse_line(line: &str) -> Result<Channel, String> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 6 {
        return Err(format!("expected at least 6 fields, got {}", fields.len()));
    }

    let (name, provider) = match fields[0].split_once(';') {
        Some((name, provider)) => {
            let provider = provider.trim();
            let provider = (!provider.is_empty()).then(|| provider.to_string());
            (name.trim(), provider)
        }
        None => (fields[0].trim(), None),
    };
    if name.is_empty() {
        return Err("empty channel name".to_string());
    }

    let frequency = fields[1]
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid frequency {:?}", fields[1]))?;
    let symbol_rate = fields[4]
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid symbol rate {:?}", fields[4]))?;

    Ok(Channel {
        name: name.to_string(),
        provider,
        frequency,
        parameters: fields[2].trim().to_string(),
        source: fields[3].trim().to_string(),
        symbol_rate,
    })
}

/// Parses a channel list payload and stages it as one contribution
///
/// Spawn this as the contributor's task. Each channel becomes a
/// `dvb-channel` entry aliased `ch1`, `ch2`, ... in file order, with a
/// pool address in its `mcast` field. On success the contribution
/// completes; on any parse, pool, or staging error it fails, which aborts
/// the transaction, and every address taken by this call is released.
pub async fn stage_channels<S: EntryStore>(
    feed: Contribution<S>,
    payload: Bytes,
    pool: Arc<McastPool>,
) {
    match stage_payload(&feed, &payload, &pool) {
        Ok(count) => {
            tracing::info!(
                contributor = %feed.name(),
                channels = count,
                "Channel list staged"
            );
            feed.complete();
        }
        Err(err) => feed.fail(err),
    }
}

fn stage_payload<S: EntryStore>(
    feed: &Contribution<S>,
    payload: &[u8],
    pool: &McastPool,
) -> Result<usize, ChannelError> {
    let text = std::str::from_utf8(payload).map_err(|_| ChannelError::NotUtf8)?;
    let channels = parse_channels(text)?;

    let mut assigned = Vec::with_capacity(channels.len());
    for (idx, channel) in channels.iter().enumerate() {
        if let Err(err) = stage_one(feed, idx, channel, pool, &mut assigned) {
            // Give back what this contribution already took, so the next
            // parse starts from the same pool state.
            for addr in assigned {
                let _ = pool.release(addr);
            }
            return Err(err);
        }
    }
    Ok(channels.len())
}

fn stage_one<S: EntryStore>(
    feed: &Contribution<S>,
    idx: usize,
    channel: &Channel,
    pool: &McastPool,
    assigned: &mut Vec<Ipv4Addr>,
) -> Result<(), ChannelError> {
    let mcast = pool.allocate()?;
    assigned.push(mcast);
    feed.add(
        format!("ch{}", idx + 1),
        "dvb-channel",
        channel.entry_fields(mcast),
    )?;
    Ok(())
}
