use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;

use paygate_core::{AccountId, TransactionId};

use crate::query::{TransactionPage, TransactionQuery, TransactionSummary};
use crate::reference::{RandomReference, ReferenceGenerator};
use crate::transaction::{NewTransaction, Transaction, TransactionStatus};

/// Attempts at drawing an unused reference number before giving up.
const MAX_REFERENCE_ATTEMPTS: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("could not allocate a unique reference number after {0} attempts")]
    ReferenceExhausted(usize),
}

/// Append-only transaction log, scoped per owner on every read.
pub trait LedgerStore: Send + Sync {
    /// Append an entry with a fresh id and reference number, `status = completed`.
    fn append(&self, new: NewTransaction) -> Result<Transaction, LedgerError>;

    /// Every entry owned by `owner_id`, in insertion order.
    fn list_by_owner(&self, owner_id: AccountId) -> Vec<Transaction>;

    /// `None` both when `id` is unknown and when it belongs to another owner.
    fn find(&self, id: &TransactionId, owner_id: AccountId) -> Option<Transaction>;

    fn query(&self, owner_id: AccountId, query: &TransactionQuery) -> TransactionPage {
        query.apply(self.list_by_owner(owner_id))
    }

    fn summary(&self, owner_id: AccountId, now: DateTime<Utc>) -> TransactionSummary {
        TransactionSummary::from_transactions(&self.list_by_owner(owner_id), now)
    }
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn append(&self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        (**self).append(new)
    }

    fn list_by_owner(&self, owner_id: AccountId) -> Vec<Transaction> {
        (**self).list_by_owner(owner_id)
    }

    fn find(&self, id: &TransactionId, owner_id: AccountId) -> Option<Transaction> {
        (**self).find(id, owner_id)
    }
}

#[derive(Debug, Default)]
struct Log {
    entries: Vec<Transaction>,
    by_id: HashMap<TransactionId, usize>,
    by_owner: HashMap<AccountId, Vec<usize>>,
    references: HashSet<String>,
    last_token: u64,
}

impl Log {
    /// Time-derived ordering token: the entry's millisecond timestamp, bumped
    /// past the previous token so ids stay strictly increasing.
    fn next_token(&mut self, at: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        let token = millis.max(self.last_token + 1);
        self.last_token = token;
        token
    }
}

/// In-memory ledger. State is lost when the process exits.
pub struct InMemoryLedgerStore {
    inner: RwLock<Log>,
    references: Box<dyn ReferenceGenerator>,
}

impl core::fmt::Debug for InMemoryLedgerStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryLedgerStore")
            .field("entries", &self.read().entries.len())
            .finish_non_exhaustive()
    }
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::with_reference_generator(RandomReference)
    }

    pub fn with_reference_generator(references: impl ReferenceGenerator + 'static) -> Self {
        Self {
            inner: RwLock::new(Log::default()),
            references: Box::new(references),
        }
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Appends either fully land or leave the log untouched, so a poisoned
    // lock still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Log> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Log> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        let mut log = self.write();

        let reference_number = (0..MAX_REFERENCE_ATTEMPTS)
            .map(|_| self.references.next_reference())
            .find(|r| !log.references.contains(r))
            .ok_or_else(|| {
                tracing::warn!(attempts = MAX_REFERENCE_ATTEMPTS, "reference number space exhausted");
                LedgerError::ReferenceExhausted(MAX_REFERENCE_ATTEMPTS)
            })?;

        let id = TransactionId::from_token(log.next_token(new.occurred_at));
        let tx = Transaction {
            id: id.clone(),
            owner_id: new.owner_id,
            amount: new.amount,
            description: new.description,
            kind: new.kind,
            status: TransactionStatus::Completed,
            reference_number: reference_number.clone(),
            created_at: new.occurred_at,
            updated_at: new.occurred_at,
        };

        let index = log.entries.len();
        log.entries.push(tx.clone());
        log.by_id.insert(id, index);
        log.by_owner.entry(tx.owner_id).or_default().push(index);
        log.references.insert(reference_number);

        Ok(tx)
    }

    fn list_by_owner(&self, owner_id: AccountId) -> Vec<Transaction> {
        let log = self.read();
        match log.by_owner.get(&owner_id) {
            Some(indexes) => indexes.iter().map(|&i| log.entries[i].clone()).collect(),
            None => Vec::new(),
        }
    }

    fn find(&self, id: &TransactionId, owner_id: AccountId) -> Option<Transaction> {
        let log = self.read();
        let tx = log.entries.get(*log.by_id.get(id)?)?;
        (tx.owner_id == owner_id).then(|| tx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::TimeZone;
    use paygate_core::Amount;
    use proptest::prelude::*;

    use crate::transaction::TransactionKind;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn new_tx(owner: u64, amount: i64, description: &str, kind: TransactionKind) -> NewTransaction {
        NewTransaction {
            owner_id: AccountId::new(owner),
            amount: Amount::from(amount),
            description: description.to_string(),
            kind,
            occurred_at: at(),
        }
    }

    /// Replays a fixed list of references, then repeats the last one.
    struct Scripted(Mutex<Vec<&'static str>>);

    impl ReferenceGenerator for Scripted {
        fn next_reference(&self) -> String {
            let mut refs = self.0.lock().unwrap();
            if refs.len() > 1 {
                refs.remove(0).to_string()
            } else {
                refs[0].to_string()
            }
        }
    }

    #[test]
    fn append_then_find_round_trips() {
        let store = InMemoryLedgerStore::new();
        let tx = store
            .append(new_tx(7, 1500, "x", TransactionKind::Credit))
            .unwrap();

        let found = store.find(&tx.id, AccountId::new(7)).unwrap();
        assert_eq!(found.amount, Amount::from(1500));
        assert_eq!(found.description, "x");
        assert_eq!(found.kind, TransactionKind::Credit);
        assert_eq!(found.status, TransactionStatus::Completed);
        assert!(!found.reference_number.is_empty());
        assert!(found.id.as_str().starts_with("TXN"));
        assert_eq!(found.created_at, found.updated_at);
    }

    #[test]
    fn ids_are_strictly_increasing_within_one_millisecond() {
        let store = InMemoryLedgerStore::new();
        let a = store.append(new_tx(1, 1, "a", TransactionKind::Credit)).unwrap();
        let b = store.append(new_tx(1, 2, "b", TransactionKind::Credit)).unwrap();
        let c = store.append(new_tx(2, 3, "c", TransactionKind::Debit)).unwrap();

        let millis = at().timestamp_millis() as u64;
        assert_eq!(a.id, TransactionId::from_token(millis));
        assert_eq!(b.id, TransactionId::from_token(millis + 1));
        assert_eq!(c.id, TransactionId::from_token(millis + 2));
    }

    #[test]
    fn find_hides_other_owners_entries() {
        let store = InMemoryLedgerStore::new();
        let tx = store.append(new_tx(1, 10, "mine", TransactionKind::Credit)).unwrap();

        let foreign = store.find(&tx.id, AccountId::new(2));
        let missing = store.find(&TransactionId::from_token(1), AccountId::new(2));
        assert_eq!(foreign, None);
        assert_eq!(foreign, missing);
    }

    #[test]
    fn list_by_owner_preserves_insertion_order() {
        let store = InMemoryLedgerStore::new();
        store.append(new_tx(1, 10, "first", TransactionKind::Credit)).unwrap();
        store.append(new_tx(2, 20, "other", TransactionKind::Credit)).unwrap();
        store.append(new_tx(1, 30, "second", TransactionKind::Debit)).unwrap();

        let mine: Vec<_> = store
            .list_by_owner(AccountId::new(1))
            .into_iter()
            .map(|t| t.description)
            .collect();
        assert_eq!(mine, vec!["first", "second"]);
        assert!(store.list_by_owner(AccountId::new(3)).is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn duplicate_reference_is_redrawn() {
        let store = InMemoryLedgerStore::with_reference_generator(Scripted(Mutex::new(vec![
            "aaaaaaaaaaaa",
            "aaaaaaaaaaaa",
            "bbbbbbbbbbbb",
        ])));
        let first = store.append(new_tx(1, 1, "a", TransactionKind::Credit)).unwrap();
        let second = store.append(new_tx(1, 1, "b", TransactionKind::Credit)).unwrap();
        assert_eq!(first.reference_number, "aaaaaaaaaaaa");
        assert_eq!(second.reference_number, "bbbbbbbbbbbb");
    }

    #[test]
    fn exhausted_references_fail_without_appending() {
        let store = InMemoryLedgerStore::with_reference_generator(Scripted(Mutex::new(vec!["same"])));
        store.append(new_tx(1, 1, "a", TransactionKind::Credit)).unwrap();
        let err = store.append(new_tx(1, 1, "b", TransactionKind::Credit)).unwrap_err();
        assert_eq!(err, LedgerError::ReferenceExhausted(MAX_REFERENCE_ATTEMPTS));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_appends_get_unique_ids_and_references() {
        let store = Arc::new(InMemoryLedgerStore::new());

        std::thread::scope(|s| {
            for owner in 1..=8u64 {
                let store = store.clone();
                s.spawn(move || {
                    for i in 0..50 {
                        store
                            .append(new_tx(owner, i, "load", TransactionKind::Credit))
                            .unwrap();
                    }
                });
            }
        });

        let all: Vec<_> = (1..=8u64)
            .flat_map(|o| store.list_by_owner(AccountId::new(o)))
            .collect();
        assert_eq!(all.len(), 400);
        let ids: HashSet<_> = all.iter().map(|t| t.id.clone()).collect();
        let refs: HashSet<_> = all.iter().map(|t| t.reference_number.clone()).collect();
        assert_eq!(ids.len(), 400);
        assert_eq!(refs.len(), 400);
    }

    #[test]
    fn query_and_summary_are_owner_scoped() {
        let store = InMemoryLedgerStore::new();
        store.append(new_tx(1, 100, "Payment", TransactionKind::Credit)).unwrap();
        store.append(new_tx(1, 40, "Transfer", TransactionKind::Debit)).unwrap();
        store.append(new_tx(2, 999, "Payment", TransactionKind::Credit)).unwrap();

        let page = store.query(
            AccountId::new(1),
            &TransactionQuery {
                search: Some("payment".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].owner_id, AccountId::new(1));

        let summary = store.summary(AccountId::new(1), at());
        assert_eq!(summary.total_transactions, 2);
        assert_eq!(summary.credit_total, Amount::from(100));
        assert_eq!(summary.debit_total, Amount::from(40));
    }

    proptest! {
        #[test]
        fn listings_never_leak_across_owners(
            entries in prop::collection::vec((1u64..6, 1i64..10_000), 0..64)
        ) {
            let store = InMemoryLedgerStore::new();
            let mut appended = Vec::new();
            for (owner, amount) in &entries {
                appended.push(
                    store.append(new_tx(*owner, *amount, "p", TransactionKind::Credit)).unwrap()
                );
            }

            for owner in 1u64..6 {
                let listed = store.list_by_owner(AccountId::new(owner));
                let expected = entries.iter().filter(|(o, _)| *o == owner).count();
                prop_assert_eq!(listed.len(), expected);
                prop_assert!(listed.iter().all(|t| t.owner_id == AccountId::new(owner)));
            }

            for tx in &appended {
                let stranger = AccountId::new(tx.owner_id.get() + 100);
                prop_assert!(store.find(&tx.id, stranger).is_none());
                let found = store.find(&tx.id, tx.owner_id);
                prop_assert_eq!(found.as_ref(), Some(tx));
            }
        }
    }
}
