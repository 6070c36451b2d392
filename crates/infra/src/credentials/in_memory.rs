use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use relaygate_auth::{Account, NewAccount};
use relaygate_core::{AccountId, Username};

use super::{CredentialStore, StoreError};

/// In-memory credential store for tests/dev.
///
/// Ids are assigned sequentially from 1, like a database serial column.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Accounts>,
}

#[derive(Debug, Default)]
struct Accounts {
    by_username: HashMap<String, Account>,
    last_id: i64,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.read().map(|a| a.by_username.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("credential store lock poisoned".to_string()))?;

        if accounts.by_username.contains_key(account.username.as_str()) {
            return Err(StoreError::DuplicateUsername);
        }

        accounts.last_id += 1;
        let stored = Account {
            id: AccountId::new(accounts.last_id),
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
        };
        accounts
            .by_username
            .insert(stored.username.as_str().to_string(), stored.clone());
        Ok(stored)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError> {
        let accounts = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("credential store lock poisoned".to_string()))?;
        Ok(accounts.by_username.get(username.as_str()).cloned())
    }
}
