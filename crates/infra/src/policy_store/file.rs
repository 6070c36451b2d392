use std::path::PathBuf;

use async_trait::async_trait;

use relaygate_auth::{PolicyError, PolicySet, PolicyStore};

use super::parse_policy_csv;

/// Policy store backed by a casbin CSV file, re-read on every load.
#[derive(Debug, Clone)]
pub struct FilePolicyStore {
    path: PathBuf,
}

impl FilePolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PolicyStore for FilePolicyStore {
    async fn load(&self) -> Result<PolicySet, PolicyError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| PolicyError::Store(format!("{}: {e}", self.path.display())))?;
        parse_policy_csv(&text)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
