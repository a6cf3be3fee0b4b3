//! Account registry: registration records, profiles and balances.
//!
//! Pure in-process state: no IO, no HTTP. Password hashing happens before a
//! record reaches the store; the store only keeps the digest.

pub mod account;
pub mod store;

pub use account::{Account, AccountError, AccountStatus, NewAccount, ProfileUpdate, UniqueField};
pub use store::{AccountStore, InMemoryAccountStore};
