//! Registered account records as seen by the authentication layer.

use serde::{Deserialize, Serialize};

use relaygate_core::{AccountId, Username};

use crate::Role;

/// A stored account.
///
/// `password_hash` is a PHC-format string produced by a
/// [`CredentialVerifier`](crate::CredentialVerifier); it is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
}

/// Input for creating an account. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
}

impl Account {
    /// Token/policy subject for this account.
    pub fn subject(&self) -> String {
        self.id.subject()
    }
}
