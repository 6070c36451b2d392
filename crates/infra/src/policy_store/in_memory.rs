use std::sync::RwLock;

use async_trait::async_trait;

use relaygate_auth::{PolicyError, PolicySet, PolicyStore};

/// In-memory policy store for tests/dev.
///
/// `set_unavailable(true)` makes every load fail, simulating an unreachable
/// backing store.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    set: RwLock<PolicySet>,
    unavailable: RwLock<bool>,
}

impl InMemoryPolicyStore {
    pub fn new(set: PolicySet) -> Self {
        Self {
            set: RwLock::new(set),
            unavailable: RwLock::new(false),
        }
    }

    pub fn replace(&self, set: PolicySet) {
        if let Ok(mut current) = self.set.write() {
            *current = set;
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut flag) = self.unavailable.write() {
            *flag = unavailable;
        }
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn load(&self) -> Result<PolicySet, PolicyError> {
        let unavailable = self
            .unavailable
            .read()
            .map(|flag| *flag)
            .map_err(|_| PolicyError::Store("policy store lock poisoned".to_string()))?;
        if unavailable {
            return Err(PolicyError::Store("in-memory policy store marked unavailable".to_string()));
        }

        self.set
            .read()
            .map(|set| set.clone())
            .map_err(|_| PolicyError::Store("policy store lock poisoned".to_string()))
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
