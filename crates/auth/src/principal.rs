use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Policy subject: the authenticated account id in decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated caller, resolved for one request.
///
/// Only `subject` comes from the token. `roles` are re-derived from the
/// current policy snapshot, so policy changes apply without token reissue.
/// `claimed_role` is the role recorded in the token at issuance and is kept
/// for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub subject: Subject,
    pub roles: BTreeSet<Role>,
    pub claimed_role: Role,
}
