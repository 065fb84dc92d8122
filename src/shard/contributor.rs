//! Asynchronous contributor guard
//!
//! A contributor is an independent task, typically a channel list parser,
//! that stages extra entries into an open transaction. The guard keeps the
//! commit barrier up until the task reports its outcome exactly once.

use serde_json::Value;

use super::entry::EntryHandle;
use super::error::TransactionError;
use super::store::EntryStore;
use super::transaction::ShardTransaction;

/// Guard for one registered asynchronous contribution
///
/// Obtained from
/// [`ShardTransaction::contributor`](super::ShardTransaction::contributor).
/// Stage entries with [`add`](Self::add), then consume the guard with
/// [`complete`](Self::complete) or [`fail`](Self::fail). Dropping the
/// guard without doing either counts as a failure, so a panicked or
/// cancelled task can never leave commit waiting forever.
pub struct Contribution<S: EntryStore> {
    txn: ShardTransaction<S>,
    name: String,
    finished: bool,
}

impl<S: EntryStore> Contribution<S> {
    pub(super) fn new(txn: ShardTransaction<S>, name: String) -> Self {
        Self {
            txn,
            name,
            finished: false,
        }
    }

    /// Name the contributor was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stages one entry into the shared transaction
    ///
    /// Valid until the guard is consumed, even while a commit is already
    /// waiting on the barrier.
    pub fn add(
        &self,
        alias: impl Into<String>,
        kind: impl Into<String>,
        fields: Value,
    ) -> Result<EntryHandle, TransactionError> {
        self.txn.add(alias, kind, fields)
    }

    /// Reports success and lowers this contribution's barrier
    pub fn complete(mut self) {
        self.finished = true;
        self.txn.finish_contribution(&self.name, None);
    }

    /// Reports failure; the transaction will abort with this error
    pub fn fail(mut self, error: impl Into<Box<dyn std::error::Error + Send + Sync>>) {
        self.finished = true;
        self.txn.finish_contribution(&self.name, Some(error.into()));
    }
}

impl<S: EntryStore> Drop for Contribution<S> {
    fn drop(&mut self) {
        if !self.finished {
            self.txn.finish_contribution(
                &self.name,
                Some("contributor dropped before completing".into()),
            );
        }
    }
}
