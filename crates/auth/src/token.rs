//! Stateless session tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use paygate_core::AccountId;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

/// Session lifetime in hours when configuration does not override it.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token lifetime overflows the clock")]
    ExpiryOutOfRange,
}

/// Mints bearer tokens for authenticated accounts.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, account_id: AccountId, now: DateTime<Utc>) -> Result<String, TokenError>;
}

/// Resolves a bearer token back to the account it was issued for.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccountId, TokenValidationError>;
}

/// HS256 issuer/verifier sharing one process-wide secret.
#[derive(Clone)]
pub struct Hs256SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for Hs256SessionTokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256SessionTokens")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Hs256SessionTokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn validation() -> Validation {
        // Expiry is checked by `validate_claims` against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl TokenIssuer for Hs256SessionTokens {
    fn issue(&self, account_id: AccountId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = SessionClaims::new(account_id, now, expires_at);
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }
}

impl TokenVerifier for Hs256SessionTokens {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccountId, TokenValidationError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenValidationError::BadSignature
                }
                _ => TokenValidationError::Malformed,
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims.sub)
    }
}
