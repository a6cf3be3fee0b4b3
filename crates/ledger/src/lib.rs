//! Transaction ledger: an append-only log of per-account entries.
//!
//! Pure in-process state: no IO, no HTTP, no persistence concerns. Entries are
//! never mutated or removed once appended, and every read is scoped to the
//! owning account.

pub mod query;
pub mod reference;
pub mod store;
pub mod transaction;

pub use query::{Pagination, TransactionPage, TransactionQuery, TransactionSummary};
pub use reference::{RandomReference, ReferenceGenerator};
pub use store::{InMemoryLedgerStore, LedgerError, LedgerStore};
pub use transaction::{NewTransaction, Transaction, TransactionKind, TransactionStatus};
