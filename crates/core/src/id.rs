//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an account.
///
/// Assigned by the account store from a counter starting at 1; never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(u64);

impl AccountId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for AccountId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<AccountId> for u64 {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl FromStr for AccountId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| DomainError::invalid_id(format!("AccountId: {e}")))
    }
}

/// Identifier of a ledger transaction: `TXN` followed by a time-derived token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub const PREFIX: &'static str = "TXN";

    /// Build an id from a unique ordering token (Unix milliseconds in practice).
    pub fn from_token(token: u64) -> Self {
        Self(format!("{}{token}", Self::PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TransactionId {
    type Err = DomainError;

    /// Accepts any string with the `TXN` prefix followed by at least one character.
    ///
    /// Lookups with an unknown but well-formed id simply miss.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(Self::PREFIX) {
            Some(rest) if !rest.is_empty() => Ok(Self(s.to_string())),
            _ => Err(DomainError::invalid_id(format!("TransactionId: {s}"))),
        }
    }
}
