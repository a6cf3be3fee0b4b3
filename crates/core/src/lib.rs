//! `paygate-core`: shared domain primitives for the payment back office.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::DomainError;
pub use id::{AccountId, TransactionId};
pub use money::Amount;
