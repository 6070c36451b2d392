use async_trait::async_trait;
use thiserror::Error;

use relaygate_auth::{Account, NewAccount};
use relaygate_core::Username;

/// Errors that can occur when interacting with a credential store.
///
/// `DuplicateUsername` is a caller error; `Backend` is an operational fault
/// whose detail must stay server-side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("username already taken")]
    DuplicateUsername,

    #[error("credential store failure: {0}")]
    Backend(String),
}

/// Persistent (username, password-hash, role) records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new account; the store assigns the id.
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Look up an account by exact username.
    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError>;
}
