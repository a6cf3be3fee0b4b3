use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paygate_core::AccountId;

/// Session token claims (transport-agnostic).
///
/// Timestamps are Unix seconds, matching the registered JWT claim names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated account.
    pub sub: AccountId,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(sub: AccountId, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Why a presented token was rejected.
///
/// Callers must not surface the variant: every kind maps to the same
/// "unauthorized" outcome at the HTTP boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token could not be decoded")]
    Malformed,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// happens in [`crate::token`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn claims_inside_window_are_valid() {
        let now = Utc::now();
        let claims = SessionClaims::new(AccountId::new(1), now, now + Duration::hours(24));
        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(validate_claims(&claims, now + Duration::hours(23)), Ok(()));
    }

    #[test]
    fn claims_past_expiry_are_expired() {
        let now = Utc::now();
        let claims = SessionClaims::new(AccountId::new(1), now, now + Duration::hours(24));
        assert_eq!(
            validate_claims(&claims, now + Duration::hours(24)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let claims = SessionClaims::new(AccountId::new(1), now, now);
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn future_issue_time_is_rejected() {
        let now = Utc::now();
        let claims = SessionClaims::new(AccountId::new(1), now + Duration::hours(1), now + Duration::hours(2));
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::NotYetValid));
    }
}
