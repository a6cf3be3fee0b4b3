use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paygate_core::{AccountId, Amount, TransactionId};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Credit,
    Debit,
}

/// Settlement state. Entries are written as `Completed`; the other states
/// exist for the dashboard filters and a future settlement path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// One immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner_id: AccountId,
    pub amount: Amount,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// Caller-facing reconciliation number (RRN).
    #[serde(alias = "rrn")]
    pub reference_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`crate::LedgerStore::append`].
///
/// The store does not validate `amount` or `owner_id`; callers own that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub owner_id: AccountId,
    pub amount: Amount,
    pub description: String,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
}
