//! `paygate-auth`: credential hashing and session tokens.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! turn a password into a digest and an account id into a signed bearer token,
//! and back, nothing more.

pub mod claims;
pub mod password;
pub mod token;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use password::{CredentialHasher, HashCost, HashError, PasswordDigest};
pub use token::{Hs256SessionTokens, TokenError, TokenIssuer, TokenVerifier, DEFAULT_TOKEN_TTL_HOURS};
