//! One-way password hashing (Argon2id, PHC strings).

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use thiserror::Error;

/// Input hashed once at construction so that logins for unknown emails pay
/// the same verification cost as logins with a wrong password.
const TIMING_EQUALIZER: &str = "paygate/absent-account";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("password hashing failed")]
    Hashing,
}

/// Argon2 work factor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    /// The argon2 crate's recommended defaults (19 MiB, 2 passes, 1 lane).
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashCost {
    /// Cheapest cost argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

/// A PHC-encoded password digest. Never serialized, never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Credential hasher: `hash` and `verify`, nothing else.
///
/// Hashing is CPU-bound; async callers should run it on a blocking thread.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    absent: PasswordDigest,
}

impl core::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

impl CredentialHasher {
    pub fn new(cost: HashCost) -> Result<Self, HashError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| HashError::Params(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut hasher = Self {
            argon2,
            absent: PasswordDigest(String::new()),
        };
        hasher.absent = hasher.hash(TIMING_EQUALIZER)?;
        Ok(hasher)
    }

    pub fn hash(&self, plaintext: &str) -> Result<PasswordDigest, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| HashError::Hashing)?
            .to_string();
        Ok(PasswordDigest(phc))
    }

    /// `false` both on mismatch and on a digest that cannot be parsed.
    pub fn verify(&self, plaintext: &str, digest: &PasswordDigest) -> bool {
        let Ok(parsed) = PasswordHash::new(digest.as_phc()) else {
            tracing::warn!("stored password digest is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burn one verification against a dummy digest. Always `false`.
    pub fn verify_absent(&self, plaintext: &str) -> bool {
        let _ = self.verify(plaintext, &self.absent);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(HashCost::minimal()).unwrap()
    }

    #[test]
    fn verify_accepts_original_password() {
        let h = hasher();
        let digest = h.hash("correct horse").unwrap();
        assert!(h.verify("correct horse", &digest));
        assert!(!h.verify("wrong horse", &digest));
    }

    #[test]
    fn digests_are_salted() {
        let h = hasher();
        let a = h.hash("pw").unwrap();
        let b = h.hash("pw").unwrap();
        assert_ne!(a, b);
        assert!(a.as_phc().starts_with("$argon2id$"));
        assert!(!a.as_phc().contains("pw$"));
    }

    #[test]
    fn garbage_digest_never_verifies() {
        let h = hasher();
        assert!(!h.verify("pw", &PasswordDigest::from_phc("not-a-phc-string")));
    }

    #[test]
    fn absent_verification_is_always_false() {
        let h = hasher();
        assert!(!h.verify_absent(TIMING_EQUALIZER));
        assert!(!h.verify_absent("anything"));
    }

    #[test]
    fn debug_output_hides_digest() {
        let h = hasher();
        let digest = h.hash("pw").unwrap();
        assert_eq!(format!("{digest:?}"), "PasswordDigest(<redacted>)");
    }

    #[test]
    fn invalid_cost_is_rejected() {
        let cost = HashCost {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        };
        assert!(matches!(CredentialHasher::new(cost), Err(HashError::Params(_))));
    }
}
