//! Process-wide policy engine with atomic snapshot replacement.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::Role;
use crate::policy::{PolicyError, PolicyRule, PolicySnapshot, PolicyStore};

/// Summary of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rules: usize,
    pub assignments: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Holds the current [`PolicySnapshot`] and answers permission queries.
///
/// ## Concurrency
///
/// The lock guards only an `Arc` pointer. Readers clone the `Arc` and
/// release the lock before evaluating; `load` builds the new snapshot
/// outside the lock and holds the write lock only for the swap. Readers
/// therefore see either the old snapshot or the new one, never a mix.
///
/// ## Failure
///
/// Construction performs the first load and fails if it fails, so an engine
/// always has a snapshot to serve. A later failed `load` leaves the previous
/// snapshot in place.
pub struct PolicyEngine {
    store: Arc<dyn PolicyStore>,
    current: RwLock<Arc<PolicySnapshot>>,
}

impl PolicyEngine {
    pub async fn new(store: Arc<dyn PolicyStore>) -> Result<Self, PolicyError> {
        let snapshot = Self::fetch(store.as_ref()).await?;
        info!(
            store = store.name(),
            rules = snapshot.rule_count(),
            assignments = snapshot.assignment_count(),
            "initial policy loaded"
        );
        Ok(Self {
            store,
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Reload the full rule set from the store and swap it in.
    pub async fn load(&self) -> Result<LoadReport, PolicyError> {
        let snapshot = match Self::fetch(self.store.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let previous = self.snapshot();
                warn!(
                    store = self.store.name(),
                    error = %e,
                    serving_since = %previous.loaded_at(),
                    "policy reload failed; keeping previous snapshot"
                );
                return Err(e);
            }
        };

        let report = LoadReport {
            rules: snapshot.rule_count(),
            assignments: snapshot.assignment_count(),
            loaded_at: snapshot.loaded_at(),
        };

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        info!(
            store = self.store.name(),
            rules = report.rules,
            assignments = report.assignments,
            "policy reloaded"
        );
        Ok(report)
    }

    /// The snapshot current at the moment of the call.
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Default-deny permission check.
    pub fn enforce(&self, subject: &str, resource: &str, action: &str) -> bool {
        self.snapshot().enforce(subject, resource, action)
    }

    /// The rule that would grant the request, if any.
    pub fn explain(&self, subject: &str, resource: &str, action: &str) -> Option<PolicyRule> {
        self.snapshot().explain(subject, resource, action).cloned()
    }

    pub fn roles_for(&self, subject: &str) -> BTreeSet<Role> {
        self.snapshot().roles_for(subject)
    }

    pub fn implicit_roles_for(&self, subject: &str) -> BTreeSet<Role> {
        self.snapshot().implicit_roles_for(subject)
    }

    async fn fetch(store: &dyn PolicyStore) -> Result<PolicySnapshot, PolicyError> {
        let set = store.load().await?;
        PolicySnapshot::build(set, Utc::now())
    }
}

impl core::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("PolicyEngine")
            .field("store", &self.store.name())
            .field("rules", &snapshot.rule_count())
            .field("assignments", &snapshot.assignment_count())
            .finish()
    }
}
