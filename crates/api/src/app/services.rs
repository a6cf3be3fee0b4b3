//! Service wiring and the core operations behind every route.
//!
//! Stores are constructed once per process (or per test) and injected here;
//! nothing in the API reaches for global state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use paygate_accounts::{
    Account, AccountError, AccountStatus, AccountStore, InMemoryAccountStore, NewAccount, ProfileUpdate,
};
use paygate_auth::{CredentialHasher, HashError, Hs256SessionTokens, TokenIssuer, TokenVerifier};
use paygate_core::{AccountId, Amount, TransactionId};
use paygate_ledger::{
    InMemoryLedgerStore, LedgerStore, NewTransaction, Transaction, TransactionKind, TransactionPage,
    TransactionQuery, TransactionSummary,
};

use crate::config::ApiConfig;

/// Outcome categories visible at the HTTP boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("conflict: {0}")]
    Conflict(&'static str),

    /// Unknown email or wrong password; the two are deliberately merged.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    /// Absent, or owned by someone else.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<HashError> for ServiceError {
    fn from(e: HashError) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

/// Registration input, password still in plaintext.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub company_name: String,
    pub tax_id: String,
    pub password: String,
}

/// Mutable profile fields.
#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub company_name: String,
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account: Account,
}

#[derive(Clone)]
pub struct AppServices {
    accounts: Arc<dyn AccountStore>,
    ledger: Arc<dyn LedgerStore>,
    hasher: Arc<CredentialHasher>,
    tokens: Arc<Hs256SessionTokens>,
}

/// Build the in-memory service graph for one process.
pub fn build_services(config: &ApiConfig) -> Result<AppServices, HashError> {
    let hasher = CredentialHasher::new(config.hash_cost)?;
    let tokens = Hs256SessionTokens::new(config.jwt_secret.as_bytes(), config.token_ttl);

    Ok(AppServices::new(
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(InMemoryLedgerStore::new()),
        hasher,
        tokens,
    ))
}

impl AppServices {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        ledger: Arc<dyn LedgerStore>,
        hasher: CredentialHasher,
        tokens: Hs256SessionTokens,
    ) -> Self {
        Self {
            accounts,
            ledger,
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
        }
    }

    pub fn accounts(&self) -> Arc<dyn AccountStore> {
        self.accounts.clone()
    }

    pub fn token_verifier(&self) -> Arc<dyn TokenVerifier> {
        self.tokens.clone()
    }

    // -------------------------
    // Accounts
    // -------------------------

    pub async fn register(&self, input: Registration) -> Result<Account, ServiceError> {
        require_non_empty("email", &input.email)?;
        require_non_empty("tax_id", &input.tax_id)?;
        require_non_empty("password", &input.password)?;

        let hasher = self.hasher.clone();
        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("hashing task failed: {e}")))??;

        let account = self
            .accounts
            .insert(NewAccount {
                name: input.name,
                email: input.email,
                mobile: input.mobile,
                company_name: input.company_name,
                tax_id: input.tax_id,
                password_hash,
                occurred_at: Utc::now(),
            })
            .map_err(|e| match e {
                AccountError::Conflict(field) => {
                    tracing::warn!(%field, "registration rejected: duplicate");
                    ServiceError::Conflict("User already exists")
                }
                AccountError::NotFound => ServiceError::Internal("insert reported not found".to_string()),
            })?;

        tracing::info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Check credentials. Unknown email, wrong password and suspended accounts
    /// fail identically, after the same amount of hashing work.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, ServiceError> {
        let candidate = self.accounts.find_by_email(email);

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let digest = candidate.as_ref().map(|a| a.password_digest().clone());
        let verified = tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&password, &digest),
            None => hasher.verify_absent(&password),
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("verification task failed: {e}")))?;

        match candidate {
            Some(account) if verified && account.status == AccountStatus::Active => Ok(account),
            _ => {
                tracing::warn!("login rejected");
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        let account = self.authenticate(email, password).await?;
        let token = self
            .tokens
            .issue(account.id, Utc::now())
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tracing::info!(account_id = %account.id, "session issued");
        Ok(Session { token, account })
    }

    pub fn find_account(&self, id: AccountId) -> Result<Account, ServiceError> {
        self.accounts.find_by_id(id).ok_or(ServiceError::NotFound("User"))
    }

    pub fn update_profile(&self, id: AccountId, fields: ProfileFields) -> Result<Account, ServiceError> {
        require_non_empty("email", &fields.email)?;

        let update = ProfileUpdate {
            name: fields.name,
            email: fields.email,
            mobile: fields.mobile,
            company_name: fields.company_name,
            occurred_at: Utc::now(),
        };

        self.accounts.update_profile(id, update).map_err(|e| match e {
            AccountError::NotFound => ServiceError::NotFound("User"),
            AccountError::Conflict(field) => {
                tracing::warn!(account_id = %id, %field, "profile update rejected: duplicate");
                ServiceError::Conflict("Email already in use")
            }
        })
    }

    /// Stored balance. Not derived from the ledger.
    pub fn get_balance(&self, id: AccountId) -> Result<Amount, ServiceError> {
        self.accounts.balance(id).ok_or(ServiceError::NotFound("User"))
    }

    // -------------------------
    // Ledger
    // -------------------------

    pub fn create_transaction(
        &self,
        owner_id: AccountId,
        amount: Amount,
        description: String,
        kind: TransactionKind,
    ) -> Result<Transaction, ServiceError> {
        if !amount.is_positive() {
            return Err(ServiceError::Validation("amount must be greater than zero".to_string()));
        }

        let tx = self
            .ledger
            .append(NewTransaction {
                owner_id,
                amount,
                description,
                kind,
                occurred_at: Utc::now(),
            })
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tracing::info!(account_id = %owner_id, transaction_id = %tx.id, "transaction appended");
        Ok(tx)
    }

    pub fn list_transactions(&self, owner_id: AccountId, query: &TransactionQuery) -> TransactionPage {
        self.ledger.query(owner_id, query)
    }

    /// Unparsable ids, unknown ids and other owners' ids are all "not found".
    pub fn get_transaction(&self, owner_id: AccountId, id: &str) -> Result<Transaction, ServiceError> {
        id.parse::<TransactionId>()
            .ok()
            .and_then(|id| self.ledger.find(&id, owner_id))
            .ok_or(ServiceError::NotFound("Transaction"))
    }

    pub fn transaction_summary(&self, owner_id: AccountId, now: DateTime<Utc>) -> TransactionSummary {
        self.ledger.summary(owner_id, now)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(())
}
