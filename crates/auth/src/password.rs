//! One-way password hashing and verification (Argon2id).

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, Params};
use thiserror::Error;

use relaygate_core::PlainPassword;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The password does not match the stored hash.
    #[error("password mismatch")]
    Mismatch,

    /// The stored hash is unusable or the hasher failed. Operational fault.
    #[error("password hashing failure: {0}")]
    HashingFailure(String),
}

/// Hashes and checks passwords against stored irreversible hashes.
pub trait CredentialVerifier: Send + Sync {
    /// Produce a salted PHC string. Output differs on every call.
    fn hash(&self, password: &PlainPassword) -> Result<String, CredentialError>;

    /// Check `password` against a PHC string produced by [`hash`](Self::hash).
    fn verify(&self, password: &PlainPassword, hash: &str) -> Result<(), CredentialError>;
}

/// Argon2id verifier. Comparison is delegated to the argon2 crate, which
/// compares digests in constant time.
#[derive(Clone, Default)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Argon2Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit cost parameters (lower costs are only sensible in tests).
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &PlainPassword) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;

        let phc = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;
        Ok(phc.to_string())
    }

    fn verify(&self, password: &PlainPassword, hash: &str) -> Result<(), CredentialError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| CredentialError::HashingFailure(e.to_string()))?;

        match self.argon2.verify_password(password.expose().as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(password_hash::Error::Password) => Err(CredentialError::Mismatch),
            Err(e) => Err(CredentialError::HashingFailure(e.to_string())),
        }
    }
}
