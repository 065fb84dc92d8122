//! Shard transaction
//!
//! An atomic batch of entry creations against one shard. Callers stage
//! entries synchronously with [`ShardTransaction::add`], hand out
//! [`Contribution`] guards to asynchronous producers, and finish with a
//! single [`ShardTransaction::commit`]. Either every staged entry becomes
//! visible in the store or none does.
//!
//! # Lifecycle
//!
//! ```text
//! Open ──▶ StagingAsync ──▶ Committing ──▶ Committed
//!   │    (contributors       │    │
//!   │     outstanding)       │    └──────▶ Aborted
//!   └────────────────────────┘      (contributor or store failure)
//! ```
//!
//! Commit blocks on a barrier until every registered contributor has
//! completed or failed, then applies the whole batch in one store call.
//! Contributors may keep staging entries while the barrier is up; once the
//! last one finishes, the batch is frozen.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::Notify;

use super::contributor::Contribution;
use super::entry::{Entry, EntryHandle};
use super::error::TransactionError;
use super::store::EntryStore;

/// Externally observable transaction phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnPhase {
    /// Accepting entries and contributor registrations
    Open,
    /// Open with at least one contributor still outstanding
    StagingAsync,
    /// Commit invoked; waiting on contributors and the store
    Committing,
    /// Every staged entry is visible in the store
    Committed,
    /// Nothing was realized
    Aborted,
}

impl TxnPhase {
    /// True for [`Committed`](Self::Committed) and [`Aborted`](Self::Aborted)
    pub fn is_terminal(self) -> bool {
        matches!(self, TxnPhase::Committed | TxnPhase::Aborted)
    }
}

// Guarded by the state mutex. `phase` never holds `StagingAsync`; that
// value is derived from `outstanding` when the phase is reported.
struct TxnState {
    phase: TxnPhase,
    staged: Vec<Entry>,
    aliases: HashSet<String>,
    outstanding: usize,
    failure: Option<TransactionError>,
}

struct TxnInner<S> {
    shard: String,
    store: S,
    state: Mutex<TxnState>,
    // Pinged whenever a contributor finishes; commit rechecks the state.
    barrier: Notify,
}

impl<S> TxnInner<S> {
    // State mutations are complete before any panic can unwind out of a
    // critical section; recover the guard instead of propagating poison.
    fn lock_state(&self) -> MutexGuard<'_, TxnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Atomic batch of entry creations against one shard
///
/// Cheap to clone; clones share state, which is how contributor guards on
/// other tasks stage into the same batch. Exactly one commit decides the
/// fate of the whole transaction.
pub struct ShardTransaction<S: EntryStore> {
    inner: Arc<TxnInner<S>>,
}

impl<S: EntryStore> Clone for ShardTransaction<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: EntryStore> ShardTransaction<S> {
    /// Opens a transaction against one shard of the given store
    pub fn new(shard: impl Into<String>, store: S) -> Self {
        let shard = shard.into();
        tracing::debug!(shard = %shard, "Transaction opened");
        Self {
            inner: Arc::new(TxnInner {
                shard,
                store,
                state: Mutex::new(TxnState {
                    phase: TxnPhase::Open,
                    staged: Vec::new(),
                    aliases: HashSet::new(),
                    outstanding: 0,
                    failure: None,
                }),
                barrier: Notify::new(),
            }),
        }
    }

    /// The shard this transaction seeds
    pub fn shard(&self) -> &str {
        &self.inner.shard
    }

    /// Current phase of the transaction
    pub fn phase(&self) -> TxnPhase {
        let state = self.inner.lock_state();
        if state.phase == TxnPhase::Open && state.outstanding > 0 {
            TxnPhase::StagingAsync
        } else {
            state.phase
        }
    }

    /// Number of entries currently staged
    pub fn staged_count(&self) -> usize {
        self.inner.lock_state().staged.len()
    }

    /// Stages one entry for creation
    ///
    /// The returned handle names the entry so later entries can reference
    /// it; references to aliases staged afterwards are equally valid, since
    /// nothing is resolved before the batch commits.
    ///
    /// Fails with [`TransactionError::DuplicateAlias`] when the alias is
    /// already staged, and with [`TransactionError::AlreadyFinalized`] once
    /// the batch is frozen or the transaction reached a terminal phase.
    pub fn add(
        &self,
        alias: impl Into<String>,
        kind: impl Into<String>,
        fields: Value,
    ) -> Result<EntryHandle, TransactionError> {
        let alias = alias.into();
        let kind = kind.into();

        let mut state = self.inner.lock_state();
        match state.phase {
            TxnPhase::Committed | TxnPhase::Aborted => {
                return Err(TransactionError::AlreadyFinalized)
            }
            // The batch freezes when commit stops waiting on contributors.
            TxnPhase::Committing if state.outstanding == 0 => {
                return Err(TransactionError::AlreadyFinalized)
            }
            _ => {}
        }
        if !state.aliases.insert(alias.clone()) {
            return Err(TransactionError::DuplicateAlias { alias });
        }
        state.staged.push(Entry::new(alias.clone(), kind.clone(), fields));
        drop(state);

        tracing::debug!(
            shard = %self.inner.shard,
            alias = %alias,
            kind = %kind,
            "Entry staged"
        );
        Ok(EntryHandle::new(alias, self.inner.shard.clone()))
    }

    /// Registers an asynchronous contributor
    ///
    /// Commit will not freeze the batch until the returned guard is
    /// consumed by [`Contribution::complete`] or [`Contribution::fail`].
    /// Registration is only accepted while the transaction is open and no
    /// commit has started.
    pub fn contributor(
        &self,
        name: impl Into<String>,
    ) -> Result<Contribution<S>, TransactionError> {
        let name = name.into();

        let mut state = self.inner.lock_state();
        if state.phase != TxnPhase::Open {
            return Err(TransactionError::AlreadyFinalized);
        }
        state.outstanding += 1;
        drop(state);

        tracing::debug!(
            shard = %self.inner.shard,
            contributor = %name,
            "Contributor registered"
        );
        Ok(Contribution::new(self.clone(), name))
    }

    pub(super) fn finish_contribution(
        &self,
        name: &str,
        failure: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) {
        let mut state = self.inner.lock_state();
        state.outstanding = state.outstanding.saturating_sub(1);
        match failure {
            Some(source) => {
                tracing::warn!(
                    shard = %self.inner.shard,
                    contributor = %name,
                    error = %source,
                    "Contributor failed"
                );
                // The first failure decides the abort; later ones only log.
                if state.failure.is_none() && !state.phase.is_terminal() {
                    state.failure = Some(TransactionError::ContributorFailed {
                        contributor: name.to_string(),
                        source,
                    });
                }
            }
            None => {
                tracing::debug!(
                    shard = %self.inner.shard,
                    contributor = %name,
                    "Contributor completed"
                );
            }
        }
        drop(state);
        self.inner.barrier.notify_one();
    }

    /// Commits the transaction
    ///
    /// Waits until every registered contributor has finished, then applies
    /// the frozen batch to the store in a single call. On any contributor
    /// or store failure the transaction aborts and nothing becomes visible.
    /// Only the first commit is accepted; later calls fail with
    /// [`TransactionError::AlreadyFinalized`].
    pub async fn commit(&self) -> Result<(), TransactionError> {
        {
            let mut state = self.inner.lock_state();
            if state.phase != TxnPhase::Open {
                return Err(TransactionError::AlreadyFinalized);
            }
            state.phase = TxnPhase::Committing;
        }

        // Contributor barrier. The notified future is created before the
        // state is checked so a finish between check and await still wakes
        // the loop.
        let batch = loop {
            let notified = self.inner.barrier.notified();
            {
                let mut state = self.inner.lock_state();
                if let Some(failure) = state.failure.take() {
                    state.phase = TxnPhase::Aborted;
                    state.staged.clear();
                    drop(state);
                    tracing::warn!(
                        shard = %self.inner.shard,
                        error = %failure,
                        "Transaction aborted"
                    );
                    return Err(failure);
                }
                if state.outstanding == 0 {
                    break std::mem::take(&mut state.staged);
                }
            }
            notified.await;
        };

        let count = batch.len();
        match self.inner.store.apply(&self.inner.shard, batch).await {
            Ok(()) => {
                self.inner.lock_state().phase = TxnPhase::Committed;
                tracing::info!(
                    shard = %self.inner.shard,
                    entries = count,
                    "Transaction committed"
                );
                Ok(())
            }
            Err(err) => {
                self.inner.lock_state().phase = TxnPhase::Aborted;
                let failure = TransactionError::StoreApply(err);
                tracing::warn!(
                    shard = %self.inner.shard,
                    error = %failure,
                    "Transaction aborted"
                );
                Err(failure)
            }
        }
    }
}
