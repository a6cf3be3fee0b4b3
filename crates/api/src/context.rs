use paygate_core::AccountId;

/// Authenticated account context for a request.
///
/// Inserted by the authentication gate; every protected handler reads the
/// caller's identity from here and nowhere else.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccountContext {
    account_id: AccountId,
}

impl AccountContext {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }
}
