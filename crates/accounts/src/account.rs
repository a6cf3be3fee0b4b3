use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paygate_auth::PasswordDigest;
use paygate_core::{AccountId, Amount};

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account can log in and transact.
    #[default]
    Active,
    /// Reserved: nothing moves an account here yet.
    Suspended,
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// A registered merchant account.
///
/// # Invariants
/// - `id` is assigned by the store and never reused.
/// - No two accounts share `email` or `tax_id`.
/// - The password digest is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub company_name: String,
    pub tax_id: String,
    #[serde(skip)]
    password_hash: PasswordDigest,
    pub balance: Amount,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub(crate) fn create(id: AccountId, new: NewAccount) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            mobile: new.mobile,
            company_name: new.company_name,
            tax_id: new.tax_id,
            password_hash: new.password_hash,
            balance: Amount::ZERO,
            status: AccountStatus::Active,
            created_at: new.occurred_at,
            updated_at: new.occurred_at,
        }
    }

    pub(crate) fn apply_profile(&mut self, update: ProfileUpdate) {
        self.name = update.name;
        self.email = update.email;
        self.mobile = update.mobile;
        self.company_name = update.company_name;
        self.updated_at = update.occurred_at;
    }

    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_hash
    }
}

/// Input for registering an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub company_name: String,
    pub tax_id: String,
    pub password_hash: PasswordDigest,
    pub occurred_at: DateTime<Utc>,
}

/// Replacement values for the mutable profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub company_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Which uniqueness constraint a write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    TaxId,
}

impl core::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::TaxId => f.write_str("tax_id"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("an account with this {0} already exists")]
    Conflict(UniqueField),

    #[error("account not found")]
    NotFound,
}
