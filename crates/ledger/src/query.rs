//! Filtering, pagination and summaries over one account's transactions.
//!
//! All functions here operate on an already owner-scoped slice; they never
//! see another account's entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paygate_core::Amount;

use crate::transaction::{Transaction, TransactionKind, TransactionStatus};

/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Offset/limit window. Both are optional so that a bare listing stays unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Pagination {
    pub fn is_unbounded(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }

    /// Effective limit, capped at [`MAX_PAGE_SIZE`] once any window is requested.
    pub fn effective_limit(&self) -> Option<usize> {
        if self.is_unbounded() {
            None
        } else {
            Some(self.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE))
        }
    }
}

/// Listing filters mirroring the dashboard's search box and status dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub status: Option<TransactionStatus>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    /// Case-insensitive substring match on id, reference number or description.
    pub search: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl TransactionQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit,
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(status) = self.status {
            if tx.status != status {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if tx.kind != kind {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                tx.id.as_str().to_lowercase().contains(&term)
                    || tx.reference_number.to_lowercase().contains(&term)
                    || tx.description.to_lowercase().contains(&term)
            }
        }
    }

    /// Filter then window, preserving the input (insertion) order.
    pub fn apply(&self, transactions: Vec<Transaction>) -> TransactionPage {
        let matching: Vec<Transaction> = transactions.into_iter().filter(|t| self.matches(t)).collect();
        let total = matching.len();
        let pagination = self.pagination();
        let offset = pagination.offset.unwrap_or(0);

        let items: Vec<Transaction> = match pagination.effective_limit() {
            None => matching,
            Some(limit) => matching.into_iter().skip(offset).take(limit).collect(),
        };
        let has_more = offset.saturating_add(items.len()) < total;

        TransactionPage { items, total, has_more }
    }
}

/// Result of a [`TransactionQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    /// Number of matching entries across all pages.
    pub total: usize,
    pub has_more: bool,
}

/// Dashboard headline figures for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    pub total_transactions: usize,
    pub today_transactions: usize,
    pub credit_total: Amount,
    pub debit_total: Amount,
    pub completed: usize,
    pub pending: usize,
    pub failed: usize,
}

impl TransactionSummary {
    /// "Today" is the UTC calendar day of `now`.
    pub fn from_transactions(transactions: &[Transaction], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let mut summary = Self::default();

        for tx in transactions {
            summary.total_transactions += 1;
            if tx.created_at.date_naive() == today {
                summary.today_transactions += 1;
            }
            match tx.kind {
                TransactionKind::Credit => summary.credit_total += tx.amount,
                TransactionKind::Debit => summary.debit_total += tx.amount,
            }
            match tx.status {
                TransactionStatus::Completed => summary.completed += 1,
                TransactionStatus::Pending => summary.pending += 1,
                TransactionStatus::Failed => summary.failed += 1,
            }
        }

        summary
    }
}
