use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use paygate_core::{AccountId, Amount};

use crate::account::{Account, AccountError, NewAccount, ProfileUpdate, UniqueField};

/// Account registry abstraction.
///
/// Implementations must make the uniqueness check and the insert in
/// [`AccountStore::insert`] a single atomic step with respect to other writers.
pub trait AccountStore: Send + Sync {
    /// Assign the next id and store the account, unless email or tax id is taken.
    fn insert(&self, new: NewAccount) -> Result<Account, AccountError>;
    fn find_by_id(&self, id: AccountId) -> Option<Account>;
    fn find_by_email(&self, email: &str) -> Option<Account>;
    /// Replace the mutable profile fields. A changed email is re-checked for uniqueness.
    fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> Result<Account, AccountError>;
    fn balance(&self, id: AccountId) -> Option<Amount>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    fn insert(&self, new: NewAccount) -> Result<Account, AccountError> {
        (**self).insert(new)
    }

    fn find_by_id(&self, id: AccountId) -> Option<Account> {
        (**self).find_by_id(id)
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        (**self).find_by_email(email)
    }

    fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> Result<Account, AccountError> {
        (**self).update_profile(id, update)
    }

    fn balance(&self, id: AccountId) -> Option<Amount> {
        (**self).balance(id)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

#[derive(Debug)]
struct Registry {
    accounts: BTreeMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
    by_tax_id: HashMap<String, AccountId>,
    last_id: u64,
}

/// In-memory account registry. State is lost when the process exits.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    inner: RwLock<Registry>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry {
                accounts: BTreeMap::new(),
                by_email: HashMap::new(),
                by_tax_id: HashMap::new(),
                last_id: 0,
            }),
        }
    }

    // A panic while holding the lock cannot leave the indexes half-written
    // (every mutation is a handful of infallible inserts), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn insert(&self, new: NewAccount) -> Result<Account, AccountError> {
        let mut reg = self.write();

        if reg.by_email.contains_key(&new.email) {
            return Err(AccountError::Conflict(UniqueField::Email));
        }
        if reg.by_tax_id.contains_key(&new.tax_id) {
            return Err(AccountError::Conflict(UniqueField::TaxId));
        }

        reg.last_id += 1;
        let id = AccountId::new(reg.last_id);
        let account = Account::create(id, new);

        reg.by_email.insert(account.email.clone(), id);
        reg.by_tax_id.insert(account.tax_id.clone(), id);
        reg.accounts.insert(id, account.clone());

        tracing::debug!(account_id = %id, "account inserted");
        Ok(account)
    }

    fn find_by_id(&self, id: AccountId) -> Option<Account> {
        self.read().accounts.get(&id).cloned()
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        let reg = self.read();
        let id = reg.by_email.get(email)?;
        reg.accounts.get(id).cloned()
    }

    fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> Result<Account, AccountError> {
        let mut reg = self.write();

        let old_email = match reg.accounts.get(&id) {
            Some(a) => a.email.clone(),
            None => return Err(AccountError::NotFound),
        };

        if update.email != old_email {
            if let Some(owner) = reg.by_email.get(&update.email) {
                if *owner != id {
                    return Err(AccountError::Conflict(UniqueField::Email));
                }
            }
            reg.by_email.remove(&old_email);
            reg.by_email.insert(update.email.clone(), id);
        }

        let account = reg.accounts.get_mut(&id).ok_or(AccountError::NotFound)?;
        account.apply_profile(update);
        Ok(account.clone())
    }

    fn balance(&self, id: AccountId) -> Option<Amount> {
        self.read().accounts.get(&id).map(|a| a.balance)
    }

    fn len(&self) -> usize {
        self.read().accounts.len()
    }
}
