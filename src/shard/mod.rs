//! Shard transactions and the entry model
//!
//! A shard is one named partition of the host's data space; seeding it
//! means creating its initial entries as a single atomic batch. The
//! transaction collects entries from the startup code and from
//! asynchronous contributors, then realizes all of them with one store
//! call:
//!
//! ```text
//! startup code ── add ──▶ ┌──────────────────┐
//!                         │ ShardTransaction │ ── commit ──▶ EntryStore
//! contributor ─── add ──▶ └──────────────────┘    (whole batch, once)
//!  (async task)
//! ```
//!
//! Aliases are unique per transaction, references between entries are
//! plain data resolved later by the consuming framework, and commit waits
//! for every contributor before freezing the batch.

pub mod contributor;
pub mod entry;
pub mod error;
pub mod store;
pub mod transaction;

pub use contributor::Contribution;
pub use entry::{Entry, EntryHandle, EntryRef};
pub use error::{StoreError, TransactionError};
pub use store::{EntryStore, MemoryStore};
pub use transaction::{ShardTransaction, TxnPhase};
