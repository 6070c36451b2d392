//! Test double for [`PolicyStore`].

use std::sync::Mutex;

use async_trait::async_trait;

use crate::policy::{PolicyError, PolicySet, PolicyStore};

#[derive(Debug, Default)]
pub(crate) struct StaticPolicyStore {
    set: Mutex<PolicySet>,
    failure: Mutex<Option<String>>,
}

impl StaticPolicyStore {
    pub(crate) fn new(set: PolicySet) -> Self {
        Self {
            set: Mutex::new(set),
            failure: Mutex::new(None),
        }
    }

    pub(crate) fn replace(&self, set: PolicySet) {
        *self.set.lock().unwrap() = set;
    }

    pub(crate) fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub(crate) fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }
}

#[async_trait]
impl PolicyStore for StaticPolicyStore {
    async fn load(&self) -> Result<PolicySet, PolicyError> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(PolicyError::Store(reason));
        }
        Ok(self.set.lock().unwrap().clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
