//! Channel list error types

use crate::pool::PoolError;
use crate::shard::TransactionError;

/// Error type for channel list parsing and staging
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The payload is not valid UTF-8
    #[error("channel list is not valid UTF-8")]
    NotUtf8,
    /// A retained line does not parse; `line` is 1-based
    #[error("bad channel line {line}: {reason}")]
    BadLine { line: usize, reason: String },
    /// Address allocation failed while wiring a channel
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// Staging into the transaction failed
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}
