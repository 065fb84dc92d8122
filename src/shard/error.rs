//! Transaction and store error types

/// Error type for shard transactions
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Alias already staged in this transaction
    #[error("alias {alias:?} is already staged in this transaction")]
    DuplicateAlias { alias: String },
    /// An asynchronous contributor reported failure; the transaction aborts
    #[error("contributor {contributor:?} failed: {source}")]
    ContributorFailed {
        contributor: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The store rejected the batch; nothing was realized
    #[error("store apply failed: {0}")]
    StoreApply(#[from] StoreError),
    /// The transaction no longer accepts this call
    #[error("transaction already finalized")]
    AlreadyFinalized,
}

/// Error type for entry store batch realization
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An alias in the batch already exists in the target shard
    #[error("alias {alias:?} already exists in shard {shard:?}")]
    DuplicateAlias { shard: String, alias: String },
    /// Backend-specific failure
    #[error("store backend: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}
