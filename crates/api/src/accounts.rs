//! Signup and signin.
//!
//! Password hashing is CPU-bound, so both flows move it onto the blocking
//! pool instead of stalling the async workers.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use relaygate_auth::{
    Account, CredentialError, CredentialVerifier, IssuedToken, NewAccount, Role, TokenCodec,
};
use relaygate_core::{PlainPassword, Username};
use relaygate_infra::{CredentialStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("username already taken")]
    DuplicateUsername,

    /// Unknown username and wrong password are deliberately the same error.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("account storage failure: {0}")]
    Storage(String),

    /// Hashing or token signing failed.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => AccountError::DuplicateUsername,
            StoreError::Backend(msg) => AccountError::Storage(msg),
        }
    }
}

pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn CredentialVerifier>,
    tokens: Arc<dyn TokenCodec>,
    default_role: Role,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn CredentialVerifier>,
        tokens: Arc<dyn TokenCodec>,
        default_role: Role,
    ) -> Self {
        Self {
            store,
            verifier,
            tokens,
            default_role,
        }
    }

    /// Register a new account with the default role.
    pub async fn signup(&self, username: &str, password: &str) -> Result<Account, AccountError> {
        let username = Username::parse(username).map_err(|e| AccountError::Malformed(e.to_string()))?;
        let password = PlainPassword::parse(password).map_err(|e| AccountError::Malformed(e.to_string()))?;

        let verifier = self.verifier.clone();
        let password_hash = tokio::task::spawn_blocking(move || verifier.hash(&password))
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?
            .map_err(|e| {
                error!(error = %e, "password hashing failed");
                AccountError::Internal(e.to_string())
            })?;

        let account = self
            .store
            .create_account(NewAccount {
                username,
                password_hash,
                role: self.default_role.clone(),
            })
            .await
            .map_err(|e| {
                if let StoreError::Backend(msg) = &e {
                    error!(error = %msg, "account creation failed");
                }
                AccountError::from(e)
            })?;

        info!(account_id = %account.id, username = %account.username, "account registered");
        Ok(account)
    }

    /// Check credentials and issue a token for the account.
    pub async fn signin(&self, username: &str, password: &str) -> Result<IssuedToken, AccountError> {
        let username = Username::parse(username).map_err(|e| AccountError::Malformed(e.to_string()))?;
        let password = PlainPassword::parse(password).map_err(|e| AccountError::Malformed(e.to_string()))?;

        let account = self
            .store
            .find_by_username(&username)
            .await
            .map_err(|e| {
                error!(error = %e, "account lookup failed");
                AccountError::from(e)
            })?
            .ok_or_else(|| {
                info!(username = %username, "signin rejected: unknown username");
                AccountError::InvalidCredentials
            })?;

        let verifier = self.verifier.clone();
        let stored_hash = account.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verifier.verify(&password, &stored_hash))
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        match verified {
            Ok(()) => {}
            Err(CredentialError::Mismatch) => {
                info!(account_id = %account.id, "signin rejected: wrong password");
                return Err(AccountError::InvalidCredentials);
            }
            Err(CredentialError::HashingFailure(msg)) => {
                error!(account_id = %account.id, error = %msg, "stored password hash unusable");
                return Err(AccountError::Internal(msg));
            }
        }

        let issued = self
            .tokens
            .issue(&account.subject(), account.role.as_str(), Utc::now())
            .map_err(|e| {
                error!(account_id = %account.id, error = %e, "token signing failed");
                AccountError::Internal(e.to_string())
            })?;

        info!(account_id = %account.id, expires_at = %issued.claims.exp, "token issued");
        Ok(issued)
    }
}
