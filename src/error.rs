//! Crate-level error type
//!
//! Each area has its own error enum; this umbrella collects them for
//! callers that drive a whole seeding run and want one `?`-friendly
//! result type.

use crate::channels::ChannelError;
use crate::pool::PoolError;
use crate::shard::{StoreError, TransactionError};

/// Convenience alias for results using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Any error this crate can produce
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Multicast pool construction or allocation failure
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// Transaction staging or commit failure
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    /// Store rejected a batch outside a transaction
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Channel list parsing or staging failure
    #[error(transparent)]
    Channel(#[from] ChannelError),
    /// Reading host-side input, e.g. a channels.conf file
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_errors_convert_with_question_mark() {
        fn run() -> Result<()> {
            Err(PoolError::Exhausted)?
        }
        assert!(matches!(run(), Err(Error::Pool(PoolError::Exhausted))));

        fn commit() -> Result<()> {
            Err(TransactionError::AlreadyFinalized)?
        }
        assert!(matches!(
            commit(),
            Err(Error::Transaction(TransactionError::AlreadyFinalized))
        ));
    }

    #[test]
    fn test_transparent_display() {
        let err = Error::from(PoolError::Exhausted);
        assert_eq!(err.to_string(), "multicast pool exhausted");
    }
}
